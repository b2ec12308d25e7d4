use crate::api::{CheckOptions, check_root};
use crate::cli::{GraphArgs, GraphFormat};
use crate::fs::default_fs;
use crate::graph::GraphData;
use crate::style;

use super::{CommandContext, EXIT_CONFIG, EXIT_OUTPUT, EXIT_PASS, emit};

pub fn cmd_graph(args: GraphArgs) -> i32 {
    let fs = default_fs();
    let options = CheckOptions {
        config: args.config.clone(),
        ..Default::default()
    };
    let ctx = match CommandContext::new(&args.path, &options, fs) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let result = match check_root(&ctx.path, &ctx.config, None, fs) {
        Ok(result) => result,
        Err(e) => {
            style::error(&e.to_string());
            return EXIT_CONFIG;
        }
    };

    let data = GraphData::from_analysis(&result);
    let content = match args.format {
        GraphFormat::Dot => data.to_dot(),
        GraphFormat::Json => match data.to_json() {
            Ok(json) => json,
            Err(e) => {
                style::error(&format!("Failed to format graph: {}", e));
                return EXIT_OUTPUT;
            }
        },
    };

    let code = emit(fs, args.output.as_deref(), &content);
    if code == EXIT_PASS {
        if let Some(output) = &args.output {
            style::success(&format!(
                "Graph of {} modules written to {}",
                data.metadata.total_modules,
                style::path(output)
            ));
        }
    }
    code
}
