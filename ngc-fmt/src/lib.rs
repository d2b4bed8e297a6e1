//! Binary I/O contract for ngc ROM files: a flat stream of little-endian
//! signed 16-bit words, no header, no alignment padding.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ngc_core::Word;
use util::Endian;

pub fn read_words<R: Read>(reader: &mut R) -> std::io::Result<Vec<Word>> {
    let mut words = Vec::new();
    loop {
        match reader.read_i16::<Endian>() {
            Ok(w) => words.push(w),
            Err(ref err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err),
        }
    }
    Ok(words)
}

pub fn write_words<W: Write>(writer: &mut W, words: &[Word]) -> std::io::Result<()> {
    for &w in words {
        writer.write_i16::<Endian>(w)?;
    }
    Ok(())
}

pub trait ReadRomExt: Read + Sized {
    fn read_rom(&mut self) -> std::io::Result<Vec<Word>> {
        read_words(self)
    }
}

impl<R: Read + Sized> ReadRomExt for R {}

pub trait WriteRomExt: Write + Sized {
    fn write_rom(&mut self, words: &[Word]) -> std::io::Result<()> {
        write_words(self, words)
    }
}

impl<W: Write + Sized> WriteRomExt for W {}

pub fn read_rom_file<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<Word>> {
    BufReader::new(File::open(path)?).read_rom()
}

pub fn write_rom_file<P: AsRef<Path>>(path: P, words: &[Word]) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_rom(words)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_through_a_buffer() {
        let words: Vec<Word> = vec![0x0005, 0xEC10u16 as Word, -1, 0];
        let mut buf = Vec::new();
        write_words(&mut buf, &words).unwrap();

        let mut cursor = Cursor::new(buf);
        let read_back = read_words(&mut cursor).unwrap();
        assert_eq!(read_back, words);
    }

    #[test]
    fn empty_stream_reads_as_empty_program() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(read_words(&mut cursor).unwrap(), Vec::<Word>::new());
    }

    #[test]
    fn encodes_little_endian() {
        let mut buf = Vec::new();
        write_words(&mut buf, &[0x0102]).unwrap();
        assert_eq!(buf, vec![0x02, 0x01]);
    }
}
