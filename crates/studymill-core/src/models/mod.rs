//! Domain models

pub mod material;

pub use material::{
    GenerateResponse, GeneratedMaterial, MaterialType, NewGeneratedMaterial,
    ParseMaterialTypeError,
};
