//! Registry of per-class custom parsers and post-processors.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::decoder::ObjectStreamDecoder;
use crate::error::ObjectStreamError;
use crate::values::{ClassData, Handle};

/// A custom class-data parser, invoked in place of default field decoding
/// for classes that override default serialization. Receives the decoder
/// (to consume stream bytes) and the handle of the class descriptor.
pub type ClassDataParser = Arc<
    dyn for<'de> Fn(&mut ObjectStreamDecoder<'de>, Handle) -> Result<ClassData, ObjectStreamError>
        + Send
        + Sync,
>;

/// A post-processor, invoked after the parser and the annotation block;
/// its return value replaces the per-class value. The annotation block is
/// available on the passed [`ClassData`].
pub type PostProcessor = Arc<
    dyn for<'de> Fn(
            &ObjectStreamDecoder<'de>,
            Handle,
            ClassData,
        ) -> Result<ClassData, ObjectStreamError>
        + Send
        + Sync,
>;

/// Mapping from `(className, serialVersionUID)` to custom class-data
/// parsers and post-processors.
///
/// Registrations are expected to happen during program startup, before
/// any parse begins; the maps are lock-protected so the process-wide
/// instance is shareable, and decoders snapshot entries per lookup.
#[derive(Default)]
pub struct Registry {
    parsers: RwLock<HashMap<String, ClassDataParser>>,
    processors: RwLock<HashMap<String, PostProcessor>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`crate::decode`] and
    /// [`ObjectStreamDecoder::new`].
    pub fn global() -> Arc<Registry> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Registry::new())).clone()
    }

    /// Builds the lookup key, validating the uid width.
    fn key(class_name: &str, serial_version_uid: &str) -> Result<String, ObjectStreamError> {
        let valid = serial_version_uid.len() == 16
            && serial_version_uid.bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(ObjectStreamError::InvalidUid(serial_version_uid.to_owned()));
        }
        Ok(format!("{}@{}", class_name, serial_version_uid))
    }

    /// Registers a custom class-data parser.
    pub fn register_parser(
        &self,
        class_name: &str,
        serial_version_uid: &str,
        parser: ClassDataParser,
    ) -> Result<(), ObjectStreamError> {
        let key = Self::key(class_name, serial_version_uid)?;
        self.parsers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, parser);
        Ok(())
    }

    /// Registers a post-processor.
    pub fn register_post_processor(
        &self,
        class_name: &str,
        serial_version_uid: &str,
        processor: PostProcessor,
    ) -> Result<(), ObjectStreamError> {
        let key = Self::key(class_name, serial_version_uid)?;
        self.processors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, processor);
        Ok(())
    }

    /// Back-compat alias for [`Registry::register_post_processor`].
    pub fn register(
        &self,
        class_name: &str,
        serial_version_uid: &str,
        processor: PostProcessor,
    ) -> Result<(), ObjectStreamError> {
        self.register_post_processor(class_name, serial_version_uid, processor)
    }

    /// Looks up a parser by `class@uid` key.
    pub fn parser(&self, key: &str) -> Option<ClassDataParser> {
        self.parsers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Looks up a post-processor by `class@uid` key.
    pub fn post_processor(&self, key: &str) -> Option<PostProcessor> {
        self.processors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}
