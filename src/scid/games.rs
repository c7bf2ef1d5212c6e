use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use crate::error::{Error, Result};

/// SCID game file (.sg4): game records stored back to back, located by the
/// offset and length held in the index.
pub struct GameFile<R = BufReader<File>> {
    reader: R,
}

impl GameFile {
    /// Open a game file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(GameFile::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> GameFile<R> {
    pub fn new(reader: R) -> Self {
        GameFile { reader }
    }

    /// Raw record bytes at `offset`.
    pub fn game_data(&mut self, offset: u32, length: u32) -> Result<Vec<u8>> {
        trace!("reading {} bytes at offset {}", length, offset);
        self.reader.seek(SeekFrom::Start(offset as u64))?;

        let mut buffer = vec![0u8; length as usize];
        self.reader.read_exact(&mut buffer).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::OutOfRange(format!(
                "game at offset {} with length {}",
                offset, length
            )),
            _ => Error::Io(e),
        })?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_game_data_at_offset() {
        let mut games = GameFile::new(Cursor::new(vec![1u8, 2, 3, 4, 5, 6]));
        assert_eq!(games.game_data(2, 3).unwrap(), vec![3, 4, 5]);
        assert_eq!(games.game_data(0, 1).unwrap(), vec![1]);
    }

    #[test]
    fn test_game_data_past_end() {
        let mut games = GameFile::new(Cursor::new(vec![1u8, 2, 3]));
        assert!(matches!(games.game_data(2, 5), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = GameFile::load("/nonexistent/games.sg4");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
