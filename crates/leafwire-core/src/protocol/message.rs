//! Payload traits.
//!
//! Every payload that crosses the processor is a [`Message`]. Native
//! records get the impl from `#[derive(Record)]`; payloads owned by an
//! alternate codec implement [`ExternalMessage`] and use
//! [`external_message!`](crate::external_message) (or wrap in [`Json`]).

use std::any::Any;
use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::{Result, WireError};

/// Encoded message body.
pub type Body = Bytes;

/// Which codec owns a payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    /// The schema-driven codec in this crate.
    Native,
    /// An external serializer.
    Alternate,
}

pub trait Message: Any + Send + Sync + fmt::Debug {
    fn codec_kind(&self) -> CodecKind;

    fn encode_body(&self, codec: &Codec) -> Result<Body>;

    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Message {
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A payload encoded by an external serializer.
pub trait ExternalMessage: Sized + Send + Sync + fmt::Debug + 'static {
    fn encode_external(&self) -> Result<Vec<u8>>;

    fn decode_external(buf: &[u8]) -> Result<Self>;
}

/// Implement `Message` for an [`ExternalMessage`] type.
#[macro_export]
macro_rules! external_message {
    ($ty:ty) => {
        impl $crate::protocol::Message for $ty {
            fn codec_kind(&self) -> $crate::protocol::CodecKind {
                $crate::protocol::CodecKind::Alternate
            }

            fn encode_body(&self, _: &$crate::codec::Codec) -> $crate::Result<$crate::protocol::Body> {
                let raw = $crate::protocol::ExternalMessage::encode_external(self)?;
                Ok($crate::protocol::Body::from(raw))
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }
    };
}

/// JSON body through `serde_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> ExternalMessage for Json<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + fmt::Debug + 'static,
{
    fn encode_external(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(|e| WireError::External(format!("json encode: {e}")))
    }

    fn decode_external(buf: &[u8]) -> Result<Self> {
        serde_json::from_slice(buf)
            .map(Json)
            .map_err(|e| WireError::External(format!("json decode: {e}")))
    }
}

impl<T> Message for Json<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + fmt::Debug + 'static,
{
    fn codec_kind(&self) -> CodecKind {
        CodecKind::Alternate
    }

    fn encode_body(&self, _: &Codec) -> Result<Body> {
        Ok(Body::from(self.encode_external()?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
