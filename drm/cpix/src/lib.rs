/*!
    CPIX (Content Protection Information Exchange) documents as exchanged
    with the key provider: request rendering and response parsing.
*/

mod error;
mod request;
mod response;
mod template;

pub use self::error::{CpixError, CpixResult};
pub use self::request::{AssetKeyRequest, CpixProfile};
pub use self::response::{ContentKey, CpixDocument, DrmSystem};
pub use self::template::Template;
