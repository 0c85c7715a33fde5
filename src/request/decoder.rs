//! Explicit response decoders attached to each request descriptor.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ParseError};

/// Declared shape of a successful response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
	/// Body is UTF-8 text returned verbatim.
	RawString,
	/// Body is JSON decoded into a typed value.
	Json,
	/// Body is returned as raw bytes.
	RawBytes,
}

/// Decoder function paired with its declared [`ResponseFormat`].
pub struct ResponseDecoder<T> {
	format: ResponseFormat,
	decode: fn(&[u8]) -> Result<T, ParseError>,
}
impl<T> ResponseDecoder<T> {
	/// Declared response format.
	pub fn format(&self) -> ResponseFormat {
		self.format
	}

	/// Decodes a successful response body.
	pub fn decode(&self, body: &[u8]) -> Result<T, ParseError> {
		(self.decode)(body)
	}
}
impl ResponseDecoder<String> {
	/// Returns the body as UTF-8 text.
	pub fn raw_string() -> Self {
		Self { format: ResponseFormat::RawString, decode: decode_string }
	}
}
impl ResponseDecoder<Vec<u8>> {
	/// Returns the body untouched.
	pub fn raw_bytes() -> Self {
		Self { format: ResponseFormat::RawBytes, decode: |body| Ok(body.to_vec()) }
	}
}
impl<T> ResponseDecoder<T>
where
	T: DeserializeOwned,
{
	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json() -> Self {
		Self { format: ResponseFormat::Json, decode: decode_json::<T> }
	}
}
impl<T> Clone for ResponseDecoder<T> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<T> Copy for ResponseDecoder<T> {}
impl<T> Debug for ResponseDecoder<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseDecoder").field("format", &self.format).finish()
	}
}

fn decode_string(body: &[u8]) -> Result<String, ParseError> {
	String::from_utf8(body.to_vec()).map_err(|source| ParseError::Utf8 { source })
}

fn decode_json<T>(body: &[u8]) -> Result<T, ParseError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| ParseError::Json { source })
}
