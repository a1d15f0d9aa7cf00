pub mod scroll;
pub mod sections;
pub mod theme;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;
