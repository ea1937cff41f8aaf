// In: src/codec/mod.rs

//! The streaming JSON codec.
//!
//! Decoding drives a `serde_json::Deserializer` directly with hand-written
//! seeds and visitors, so a document is read in one forward pass and no
//! intermediate `serde_json::Value` tree is ever built. Encoding writes through
//! a `serde_json::Serializer` the same way.
//!
//! serde only carries string messages across its error boundary. Each call
//! therefore owns a context with a failure slot: the first typed error raised
//! inside a visitor is parked there, and `resolve` hands it back to the caller
//! once serde has unwound.

mod element;
mod frame;
mod labels;
mod series;
mod token;
mod vector;


use crate::config::CodecConfig;
use crate::error::VecframeError;
use crate::model::{CategorySet, DataFrame, DataSet, Series, ValueLabels, Vector};
use crate::traits::Codable;
use log::debug;
use serde::de::{DeserializeSeed, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::error::Category;
use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

//==================================================================================
// I. Per-call Contexts
//==================================================================================

/// State shared by every nested step of one decode call.
pub struct DecodeContext {
    config: Arc<CodecConfig>,
    failure: RefCell<Option<VecframeError>>,
}

impl DecodeContext {
    pub fn new(config: Arc<CodecConfig>) -> Self {
        Self {
            config,
            failure: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Parks `err` (unless an earlier error is already parked) and returns a
    /// serde error carrying the same message.
    pub fn fail<E: de::Error>(&self, err: VecframeError) -> E {
        let message = err.to_string();
        park(&self.failure, err);
        E::custom(message)
    }

    /// Recovers the typed error behind a serde error.
    pub fn resolve(&self, err: serde_json::Error) -> VecframeError {
        resolve(&self.failure, err)
    }
}

/// State shared by every nested step of one encode call.
pub struct EncodeContext {
    config: Arc<CodecConfig>,
    failure: RefCell<Option<VecframeError>>,
}

impl EncodeContext {
    pub fn new(config: Arc<CodecConfig>) -> Self {
        Self {
            config,
            failure: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn fail<E: ser::Error>(&self, err: VecframeError) -> E {
        let message = err.to_string();
        park(&self.failure, err);
        E::custom(message)
    }

    pub fn resolve(&self, err: serde_json::Error) -> VecframeError {
        resolve(&self.failure, err)
    }
}

fn park(slot: &RefCell<Option<VecframeError>>, err: VecframeError) {
    let mut slot = slot.borrow_mut();
    if slot.is_none() {
        *slot = Some(err);
    }
}

fn resolve(slot: &RefCell<Option<VecframeError>>, err: serde_json::Error) -> VecframeError {
    if let Some(parked) = slot.borrow_mut().take() {
        return parked;
    }
    match err.classify() {
        // Type errors raised by serde itself: a value had the wrong shape.
        Category::Data => VecframeError::malformed(err.to_string()),
        _ => VecframeError::Json(err),
    }
}

/// Adapts a `Codable` value to `serde::Serialize` for one encode call.
struct Encoded<'a, T> {
    value: &'a T,
    ctx: &'a EncodeContext,
}

impl<T: Codable> Serialize for Encoded<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.encode_with(serializer, self.ctx)
    }
}

/// Adapts `Codable::decode_with` to a seed, for nested values.
struct Decoded<'c, T> {
    ctx: &'c DecodeContext,
    _value: PhantomData<T>,
}

impl<'c, T> Decoded<'c, T> {
    fn new(ctx: &'c DecodeContext) -> Self {
        Self {
            ctx,
            _value: PhantomData,
        }
    }
}

impl<'de, T: Codable> DeserializeSeed<'de> for Decoded<'_, T> {
    type Value = T;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        T::decode_with(deserializer, self.ctx)
    }
}

/// Reads an array of nested values, in order.
struct ListSeed<'c, T> {
    ctx: &'c DecodeContext,
    what: &'static str,
    _item: PhantomData<T>,
}

impl<'c, T> ListSeed<'c, T> {
    fn new(ctx: &'c DecodeContext, what: &'static str) -> Self {
        Self {
            ctx,
            what,
            _item: PhantomData,
        }
    }
}

impl<'de, T: Codable> DeserializeSeed<'de> for ListSeed<'_, T> {
    type Value = Vec<T>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Vec<T>, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, T: Codable> Visitor<'de> for ListSeed<'_, T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an array of {}", self.what)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<T>, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(64));
        while let Some(item) = seq.next_element_seed(Decoded::<T>::new(self.ctx))? {
            items.push(item);
        }
        Ok(items)
    }
}

/// Writes a slice of nested values as an array.
struct ListOut<'a, T> {
    items: &'a [T],
    ctx: &'a EncodeContext,
}

impl<T: Codable> Serialize for ListOut<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for value in self.items {
            seq.serialize_element(&Encoded { value, ctx: self.ctx })?;
        }
        seq.end()
    }
}

//==================================================================================
// II. The Codec Facade
//==================================================================================

/// Decodes and encodes wire structures under one configuration.
///
/// A `Codec` is cheap to clone and safe to share between threads; every call
/// builds its own context.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: Arc<CodecConfig>,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn with_shared_config(config: Arc<CodecConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn decode<T: Codable>(&self, json: &str) -> Result<T, VecframeError> {
        log_metric!("event" = "decode", "type" = type_name::<T>(), "bytes" = json.len());
        let mut deserializer = serde_json::Deserializer::from_str(json);
        self.decode_from(&mut deserializer)
    }

    pub fn decode_from_reader<T: Codable, R: io::Read>(&self, reader: R) -> Result<T, VecframeError> {
        debug!("decoding {} from reader", type_name::<T>());
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        self.decode_from(&mut deserializer)
    }

    /// Decodes exactly one document; trailing non-whitespace is an error.
    fn decode_from<'de, T, R>(&self, deserializer: &mut serde_json::Deserializer<R>) -> Result<T, VecframeError>
    where
        T: Codable,
        R: serde_json::de::Read<'de>,
    {
        let ctx = DecodeContext::new(Arc::clone(&self.config));
        let value = T::decode_with(&mut *deserializer, &ctx).map_err(|e| ctx.resolve(e))?;
        deserializer.end().map_err(|e| ctx.resolve(e))?;
        debug!("decoded {}", type_name::<T>());
        Ok(value)
    }

    pub fn encode<T: Codable>(&self, value: &T) -> Result<String, VecframeError> {
        let ctx = EncodeContext::new(Arc::clone(&self.config));
        let json = serde_json::to_string(&Encoded { value, ctx: &ctx }).map_err(|e| ctx.resolve(e))?;
        log_metric!("event" = "encode", "type" = type_name::<T>(), "bytes" = json.len());
        Ok(json)
    }

    pub fn encode_to_writer<T: Codable, W: io::Write>(&self, value: &T, writer: W) -> Result<(), VecframeError> {
        let ctx = EncodeContext::new(Arc::clone(&self.config));
        serde_json::to_writer(writer, &Encoded { value, ctx: &ctx }).map_err(|e| ctx.resolve(e))?;
        debug!("encoded {} to writer", type_name::<T>());
        Ok(())
    }
}

//==================================================================================
// III. Default-config Entry Points
//==================================================================================

static DEFAULT_CONFIG: OnceLock<Arc<CodecConfig>> = OnceLock::new();

fn default_config() -> Arc<CodecConfig> {
    Arc::clone(DEFAULT_CONFIG.get_or_init(|| Arc::new(CodecConfig::default())))
}

/// Decodes one document with the default configuration.
pub fn decode<T: Codable>(json: &str) -> Result<T, VecframeError> {
    Codec::with_shared_config(default_config()).decode(json)
}

/// Encodes one value with the default configuration.
pub fn encode<T: Codable>(value: &T) -> Result<String, VecframeError> {
    Codec::with_shared_config(default_config()).encode(value)
}

// Plain serde impls run under the default configuration. Typed errors are
// reported through their message only.
macro_rules! impl_serde_via_codec {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let ctx = EncodeContext::new(default_config());
                self.encode_with(serializer, &ctx)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let ctx = DecodeContext::new(default_config());
                <$ty as Codable>::decode_with(deserializer, &ctx)
            }
        }
    )+};
}

impl_serde_via_codec!(Vector, CategorySet, ValueLabels, Series, DataFrame, DataSet);
