//! dof (do-for): run a command for each element of a list.
//!
//! Items come from literal words, glob patterns, numeric sequences, or
//! stdin. They are filtered through glob, regex, and file-type rules, and a
//! command template is expanded for each survivor. The resulting command
//! lines are printed (the default) or run through the shell.
//!
//! # Example
//!
//! ```text
//! $ dof *.wav -x test* do ffmpeg -i %f %b.ogg
//! ffmpeg -i a.wav a.ogg
//! ffmpeg -i b.wav b.ogg
//! ```
//!
//! # Library use
//!
//! ```no_run
//! use dof::cli::Invocation;
//! use dof::executor::ShellRunner;
//! use dof::pipeline::Pipeline;
//!
//! let inv = Invocation {
//!     include: vec!["*.c".into()],
//!     commands: Some(vec!["wc".into(), "-l".into(), "%f".into()]),
//!     ..Invocation::default()
//! };
//! let pipeline = Pipeline::new(&inv)?;
//! let status = pipeline.run(&mut ShellRunner, &mut std::io::stdout())?;
//! # Ok::<(), dof::DofError>(())
//! ```

pub mod cli;
pub mod config;
pub mod cwd;
pub mod error;
pub mod executor;
pub mod expand;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod select;
pub mod sequence;
pub mod walk;

pub use error::{DofError, ExpandError};
pub use expand::Template;
pub use pipeline::{Flags, Pipeline};
