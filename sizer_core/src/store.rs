//! Store channels and the batch protocol client.

use crate::count::Count;
use crate::error::{Error, Result};
use crate::object::{BatchResponse, ObjectType};
use crate::oid::Oid;
use crate::tree::Tree;
use std::io::{self, BufRead, Read, Write};

/// The two queries the size engine needs from an object store.
///
/// Each call is one synchronous request/response exchange. Implementations
/// are not expected to be shared between concurrent callers.
pub trait ObjectStore {
    /// Look up an object's type and size without reading its payload.
    fn read_header(&mut self, oid: &Oid) -> Result<(ObjectType, Count)>;

    /// Read the payload of a tree object.
    fn read_tree(&mut self, oid: &Oid) -> Result<Tree>;
}

impl<S: ObjectStore + ?Sized> ObjectStore for &mut S {
    fn read_header(&mut self, oid: &Oid) -> Result<(ObjectType, Count)> {
        (**self).read_header(oid)
    }

    fn read_tree(&mut self, oid: &Oid) -> Result<Tree> {
        (**self).read_tree(oid)
    }
}

/// One ordered request/response stream to a store process.
///
/// Requests are `<hex-oid> LF`. Responses are described in
/// [`crate::object`].
#[derive(Debug)]
pub struct BatchChannel<W, R> {
    input: W,
    output: R,
}

impl<W: Write, R: BufRead> BatchChannel<W, R> {
    /// Wrap the writing and reading halves of a channel.
    pub fn new(input: W, output: R) -> Self {
        Self { input, output }
    }

    /// Send one request and parse the header line of its response.
    fn request(&mut self, oid: &Oid) -> Result<BatchResponse> {
        tracing::trace!(%oid, "store request");
        writeln!(self.input, "{}", oid)?;
        self.input.flush()?;

        let mut line = Vec::new();
        let n = self.output.read_until(b'\n', &mut line)?;
        if n == 0 {
            return Err(Error::protocol("Store process closed its output"));
        }
        if line.last() != Some(&b'\n') {
            return Err(Error::protocol("Response line ends unexpectedly"));
        }

        let line = std::str::from_utf8(&line)
            .map_err(|e| Error::protocol(format!("Response line is not UTF-8: {}", e)))?;
        let response = BatchResponse::parse(line)?;

        if response.oid() != *oid {
            return Err(Error::protocol(format!(
                "Asked for {} but store answered for {}",
                oid,
                response.oid()
            )));
        }
        Ok(response)
    }

    /// Header query: type and size of `oid`.
    pub fn read_header(&mut self, oid: &Oid) -> Result<(ObjectType, Count)> {
        match self.request(oid)? {
            BatchResponse::Missing { .. } => Err(Error::object_not_found(oid)),
            BatchResponse::Found {
                object_type, size, ..
            } => Ok((object_type, size)),
        }
    }

    /// Payload query: the contents of tree `oid`.
    ///
    /// A non-tree payload is read and discarded before the mismatch is
    /// reported, so the channel stays aligned for the next request.
    pub fn read_tree(&mut self, oid: &Oid) -> Result<Tree> {
        match self.request(oid)? {
            BatchResponse::Missing { .. } => Err(Error::object_not_found(oid)),
            BatchResponse::Found {
                object_type: ObjectType::Tree,
                size,
                ..
            } => Ok(Tree::from_bytes(self.read_payload(size)?)),
            BatchResponse::Found {
                object_type, size, ..
            } => {
                self.skip_payload(size)?;
                Err(Error::type_mismatch(oid, "tree", object_type.as_str()))
            }
        }
    }

    /// Read exactly `size` payload bytes followed by the LF delimiter.
    fn read_payload(&mut self, size: Count) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let read = (&mut self.output)
            .take(size.get())
            .read_to_end(&mut data)?;
        if (read as u64) < size.get() {
            return Err(Error::protocol(format!(
                "Short read: got {} of {} payload bytes",
                read, size
            )));
        }
        self.read_delimiter()?;
        Ok(data)
    }

    fn skip_payload(&mut self, size: Count) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.output).take(size.get()), &mut io::sink())?;
        if skipped < size.get() {
            return Err(Error::protocol(format!(
                "Short read: skipped {} of {} payload bytes",
                skipped, size
            )));
        }
        self.read_delimiter()
    }

    fn read_delimiter(&mut self) -> Result<()> {
        let mut delimiter = [0u8; 1];
        match self.output.read_exact(&mut delimiter) {
            Ok(()) if delimiter[0] == b'\n' => Ok(()),
            Ok(()) => Err(Error::protocol(format!(
                "Expected LF after payload, got {:#04x}",
                delimiter[0]
            ))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::protocol("Payload is missing its trailing LF"))
            }
            Err(e) => Err(e.into()),
        }
    }
}
