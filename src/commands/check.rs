use crate::api::{CheckOptions, CheckOutcome, check_root};
use crate::cli::{CheckArgs, OutputFormat};
use crate::config::ConfigOverrides;
use crate::fs::{FileSystem, default_fs};
use crate::style;

use super::{CommandContext, EXIT_CONFIG, EXIT_OUTPUT, EXIT_PASS, EXIT_VIOLATIONS, emit};

pub fn cmd_check(args: CheckArgs) -> i32 {
    cmd_check_with_fs(args, default_fs())
}

fn cmd_check_with_fs(args: CheckArgs, fs: &dyn FileSystem) -> i32 {
    let options = CheckOptions {
        config: args.config.clone(),
        overrides: ConfigOverrides {
            include: args.include.clone(),
            exclude: args.exclude.clone(),
            aliases: args.aliases.clone(),
            barrel: args.barrel.clone(),
            fail_on: args.fail_on,
        },
        cache: args.cache.clone(),
    };
    let ctx = match CommandContext::new(&args.path, &options, fs) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let result = match check_root(&ctx.path, &ctx.config, args.cache.as_deref(), fs) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return EXIT_CONFIG;
        }
    };
    let outcome = CheckOutcome {
        result,
        fail_on: ctx.config.fail_on,
    };

    // Colors and terminal markdown only when the report goes to a terminal
    let styled = args.output.is_none() && style::is_terminal();
    let rendered = match outcome.render(args.format, args.quiet, styled) {
        Ok(text) => text,
        Err(e) => {
            style::error(&format!("Failed to format output: {}", e));
            return EXIT_OUTPUT;
        }
    };
    let content = if args.format == OutputFormat::Markdown && styled {
        let mut buffer = Vec::new();
        if let Err(e) = style::render_markdown(&rendered, true, &mut buffer) {
            style::error(&format!("Failed to format output: {}", e));
            return EXIT_OUTPUT;
        }
        String::from_utf8_lossy(&buffer).into_owned()
    } else {
        rendered
    };

    let code = emit(fs, args.output.as_deref(), &content);
    if code != EXIT_PASS {
        return code;
    }
    if let Some(output) = &args.output {
        style::success(&format!("Report written to {}", style::path(output)));
    }

    if outcome.passed() {
        EXIT_PASS
    } else {
        EXIT_VIOLATIONS
    }
}
