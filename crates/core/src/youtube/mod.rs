pub mod transcript;
pub mod url;

pub use transcript::*;
pub use url::*;
