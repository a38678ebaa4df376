use std::fmt;
use std::fmt::{Debug, Formatter};
use std::io::Cursor;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};
use crate::core::library::{LibraryError, LibraryResult};

/// A cover image submitted with a create or edit request.
///
/// The upload is never stored. [`CoverImageUpload::materialize`] consumes it, reads the
/// declared number of bytes into one buffer and drops the stream before handing the bytes
/// back, so only the bytes outlive the request.
pub struct CoverImageUpload {
    file_name: Option<String>,
    length: u64,
    stream: Pin<Box<dyn AsyncRead + Send + Sync>>,
}

impl CoverImageUpload {
    pub fn new<R: AsyncRead + Send + Sync + 'static>(file_name: Option<String>, length: u64, stream: R) -> Self {
        Self {
            file_name,
            length,
            stream: Box::pin(stream),
        }
    }

    pub fn from_bytes(file_name: Option<String>, bytes: Vec<u8>) -> Self {
        let length = bytes.len() as u64;
        Self::new(file_name, length, Cursor::new(bytes))
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    // a zero-length upload counts as no upload at all
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub async fn materialize(self) -> LibraryResult<Vec<u8>> {
        let capacity = usize::try_from(self.length).map_err(|_| LibraryError::runtime(
            format!("upload of {} bytes does not fit in memory", self.length).as_str(), None))?;
        let mut buffer = Vec::with_capacity(capacity);
        let mut stream = self.stream.take(self.length);
        stream.read_to_end(&mut buffer).await?;
        if buffer.len() != capacity {
            return Err(LibraryError::runtime(
                format!("upload ended after {} of {} bytes", buffer.len(), self.length).as_str(), None));
        }
        Ok(buffer)
    }
}

impl Debug for CoverImageUpload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverImageUpload")
            .field("file_name", &self.file_name)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
