//! Remix Graph
//!
//! Compiles render plans into transcoder filter graphs and drives whole
//! batches:
//! - **Compiler:** per-slot trim/speed/scale stages and one N-way concat
//! - **Output:** quality-tier encoder lookup and output arguments
//! - **Batch:** plan, compile in parallel, and assemble the report
//!
//! Nothing here spawns the transcoder.

pub mod batch;
pub mod compiler;
pub mod output;

pub use batch::{compile_plans, generate_batch, BatchOutcome, CompiledPlans};
pub use compiler::compile;
pub use output::{encoder_profile, output_args, transcoder_args, EncoderProfile};
