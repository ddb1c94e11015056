pub mod progress_counter;
