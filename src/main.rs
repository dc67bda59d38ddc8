use std::process;

fn main() {
    match omt::cli::run_cli() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}
