mod encoding;
pub use encoding::{FromBase64, ToBase64};

mod util;
pub use util::getenv_default;
