use std::{env, fs, path::Path, process::ExitCode};

use kwinject::{InjectOptions, InjectTracer, Injector, ParamSpace, StderrTracer};

const USAGE: &str =
    "usage: kwinject <code.py> <space.json|space.py> [--placeholders] [--no-normalize] [--max-depth N] [--trace]";

#[derive(Debug, Default)]
struct Args {
    code_path: String,
    space_path: String,
    placeholders: bool,
    trace: bool,
    options: InjectOptions,
}

fn main() -> ExitCode {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let code = match read_file(&args.code_path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut space = match load_space(&args.space_path) {
        Ok(space) => space,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if args.placeholders {
        space = space.placeholders();
    }

    let injector = Injector::new(&space).with_options(args.options);
    let result = if args.trace {
        run(injector.with_tracer(StderrTracer::new()), &code)
    } else {
        run(injector, &code)
    };
    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<Tr: InjectTracer>(mut injector: Injector<'_, Tr>, code: &str) -> Result<String, kwinject::InjectError> {
    injector.inject(code)
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--placeholders" => args.placeholders = true,
            "--trace" => args.trace = true,
            "--no-normalize" => args.options = args.options.normalize_whitespace(false),
            "--max-depth" => {
                let value = argv.next().ok_or("--max-depth needs a value")?;
                let depth = value
                    .parse::<u16>()
                    .map_err(|err| format!("invalid --max-depth {value:?}: {err}"))?;
                args.options = args.options.max_nesting_depth(Some(depth));
            }
            "-h" | "--help" => return Err("help requested".to_owned()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => positional.push(arg),
        }
    }
    let [code_path, space_path]: [String; 2] = positional
        .try_into()
        .map_err(|got: Vec<String>| format!("expected 2 paths, got {}", got.len()))?;
    args.code_path = code_path;
    args.space_path = space_path;
    Ok(args)
}

/// `.json` files are read as JSON, anything else as a Python dict literal.
fn load_space(path: &str) -> Result<ParamSpace, String> {
    let text = read_file(path)?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let space = if is_json {
        ParamSpace::from_json_str(&text)
    } else {
        ParamSpace::from_literal(&text)
    };
    space.map_err(|err| format!("{path}: {err}"))
}

fn read_file(file_path: &str) -> Result<String, String> {
    match fs::metadata(file_path) {
        Ok(metadata) => {
            if !metadata.is_file() {
                return Err(format!("{file_path} is not a file"));
            }
        }
        Err(err) => {
            return Err(format!("cannot read {file_path}: {err}"));
        }
    }
    fs::read_to_string(file_path).map_err(|err| format!("cannot read {file_path}: {err}"))
}
