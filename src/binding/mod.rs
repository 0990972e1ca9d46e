//! Field binding descriptors and the decoder registry.
//!
//! A request struct derives [`Bindable`]; each field's `#[bind(...)]`
//! attribute names the source it is decoded from. The derive produces a
//! `&'static` [`BindingSpec`] per type, so nothing is re-derived per
//! request. The [`BinderRegistry`] maps source tags to decoders and owns
//! the distinguished path decoder plus the optional struct validator.

pub mod decoders;
pub mod registry;
pub mod spec;


pub use decoders::{CookieBinder, DefaultPathBinder, HeaderBinder, JsonBodyBinder, QueryBinder};
pub use registry::{Binder, BinderRegistry, PathBinder, PathValues};
pub use spec::{Bindable, BindingSpec, FieldBinding, FieldKind, PATH_SOURCE};

pub use routebind_macros::Bindable;
