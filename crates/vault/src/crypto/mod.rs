//! AES-256-GCM field encryption primitives.
//!
//! Seal/open operations used by the record store. Nothing here touches
//! persistence or HTTP.
//!
//! # Envelope format
//!
//! ```text
//! base64(nonce[12] || ciphertext[N] || tag[16])
//! ```
//!
//! One self-contained value per record: no auxiliary columns, no key state.

pub mod codec;
pub mod key;

pub use codec::{CodecError, FieldCodec};
pub use key::FieldKey;
