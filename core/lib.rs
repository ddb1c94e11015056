/*!
This crate evaluates a classification model over a labeled dataset and reports top-1 and top-5 accuracy. The entrypoint is [`run`](fn.run.html). The pieces it is built from, the [`Model`](model/trait.Model.html) executors, the csv [batch source](batch/index.html), and the [evaluation loops](evaluate/index.html), can also be used on their own.
*/

#![allow(clippy::tabs_in_doc_comments)]

pub mod batch;
pub mod config;
pub mod evaluate;
pub mod model;
pub mod progress;
mod run;

pub use self::run::{run, Report, RunOptions};
