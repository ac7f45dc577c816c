//! JSON cassette storage

pub mod codec;
mod format;
mod reader;
mod writer;

pub use codec::{decode_body, encode_body, is_binary};
pub use format::{
    header_map, parse_version, reason_phrase, version_to_str, Headers, RecordedResponse,
    REQUIRED_FIELDS,
};
pub use reader::{parse_entries, CassetteReader};
pub use writer::CassetteWriter;
