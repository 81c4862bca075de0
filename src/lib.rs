// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! AR Resources - GPU resource lifecycle manager
//!
//! Owns the textures, geometries, materials and models of an AR try-on
//! scene, releases anything idle for too long, deduplicates concurrent
//! preloads and keeps a periodic memory/FPS snapshot.

pub mod assets;
pub mod config;
pub mod error;
pub mod prelude;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod resources;
pub mod time;

pub use assets::*;
pub use config::*;
pub use error::*;
pub use resources::*;
