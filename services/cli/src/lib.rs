mod cli;
mod play;
mod recommend;
mod render;

use solution_finder::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
