use crate::Error;
use crate::model::Model;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::Read;
use std::io::Write;

/// the model wire format: a payload that survives process restart and
/// host endianness, preceded by a one-byte kind tag so future layouts
/// stay detectable. every encoded field round-trips bitwise.
pub trait Binary: Sized {
    /// format tag identifying the learner kind on disk
    const TAG: u8;
    /// write the payload, big-endian throughout
    fn encode<W: Write>(&self, w: &mut W) -> std::io::Result<()>;
    /// read the payload back
    fn decode<R: Read>(r: &mut R) -> std::io::Result<Self>;
}

impl Model {
    /// conventional artifact path for an algorithm selector
    pub fn path(algorithm: &str) -> String {
        format!("models/{}_model.bin", algorithm)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![];
        match self {
            Model::Tree(m) => Self::frame(&mut bytes, m)?,
            Model::Bagging(m) => Self::frame(&mut bytes, m)?,
            Model::Forest(m) => Self::frame(&mut bytes, m)?,
            Model::Boosting(m) => Self::frame(&mut bytes, m)?,
            Model::External(m) => Self::frame(&mut bytes, m)?,
        }
        Ok(bytes)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, Error> {
        let ref mut r = bytes;
        let tag = r.read_u8()?;
        match tag {
            crate::model::Tree::TAG => Ok(Model::Tree(Binary::decode(r)?)),
            crate::model::Bagging::TAG => Ok(Model::Bagging(Binary::decode(r)?)),
            crate::model::Forest::TAG => Ok(Model::Forest(Binary::decode(r)?)),
            crate::model::Boosting::TAG => Ok(Model::Boosting(Binary::decode(r)?)),
            crate::model::External::TAG => Ok(Model::External(Binary::decode(r)?)),
            tag => Err(Error::Persistence(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown model tag {}", tag),
            ))),
        }
    }

    /// persist the tagged encoding at a path, creating parents
    pub fn save(&self, path: &str) -> Result<(), Error> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// read a tagged artifact back from disk
    pub fn load(path: &str) -> Result<Self, Error> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    fn frame<B: Binary>(w: &mut Vec<u8>, payload: &B) -> std::io::Result<()> {
        w.write_u8(B::TAG)?;
        payload.encode(w)
    }
}
