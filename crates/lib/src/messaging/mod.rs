//! Encrypted direct messaging
//!
//! [`nip44`] provides the payload encryption; [`giftwrap`] layers it into
//! metadata-hiding gift wraps. Both are synchronous and CPU-bound; the
//! [`Client`](crate::Client) runs them on the blocking pool.

pub mod errors;
pub mod giftwrap;
pub mod nip44;

pub use errors::MessagingError;
pub use giftwrap::{
    DirectMessage, GiftWrap, TimestampFuzz, WrappedMessage, unwrap, wrap, wrap_with_self_copy,
};
pub use nip44::ConversationKey;
