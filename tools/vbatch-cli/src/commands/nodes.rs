//! List the node catalog.

use vbatch_common::AppConfig;
use vbatch_nodes::{NodeCatalog, ParamKind};

pub fn run(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let catalog = NodeCatalog::from_config(config);

    if json {
        println!("{}", catalog.to_json()?);
        return Ok(());
    }

    println!("VBatch nodes ({})", catalog.len());
    println!("{}", "=".repeat(50));

    let mut current_category = None;
    let mut descriptors: Vec<_> = catalog.descriptors().iter().collect();
    descriptors.sort_by(|a, b| a.category.cmp(&b.category));

    for descriptor in descriptors {
        if current_category != Some(&descriptor.category) {
            println!();
            println!("{}", descriptor.category);
            current_category = Some(&descriptor.category);
        }
        println!("  {} ({})", descriptor.display_name, descriptor.name);
        for input in &descriptor.inputs {
            println!("      in  {:<18} {}", input.name, describe_kind(&input.kind));
        }
        for output in &descriptor.outputs {
            println!("      out {:<18} {:?}", output.name, output.value_type);
        }
    }

    Ok(())
}

fn describe_kind(kind: &ParamKind) -> String {
    match kind {
        ParamKind::Int { default, min, max } => {
            let mut text = format!("int = {default}");
            if let Some(min) = min {
                text.push_str(&format!(", min {min}"));
            }
            if let Some(max) = max {
                text.push_str(&format!(", max {max}"));
            }
            text
        }
        ParamKind::Float { default, min, .. } => match min {
            Some(min) => format!("float = {default}, min {min}"),
            None => format!("float = {default}"),
        },
        ParamKind::Choice { options } => format!("one of [{}]", options.join(" | ")),
        ParamKind::FrameSet => "frame set".to_string(),
        ParamKind::Images => "images".to_string(),
    }
}
