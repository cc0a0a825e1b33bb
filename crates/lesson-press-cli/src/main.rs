use std::process;

fn main() {
    match lesson_press_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("lesson-press error: {err}");
            process::exit(1);
        }
    }
}
