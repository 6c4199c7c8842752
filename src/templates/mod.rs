pub mod registry;
pub mod substitution;

pub use registry::TemplateRegistry;
pub use substitution::render;
