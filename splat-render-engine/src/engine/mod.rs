pub mod camera;
pub mod config;
pub mod scene;
pub mod splat_material;
pub mod splat_mesh;
pub mod two_pass;
