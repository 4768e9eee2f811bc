//! Renders the literate modules of this crate to highlighted HTML, using syntect and markdown.
//! Run with ```cargo run --bin make_html```
//!
//! Source lines starting with `//-` are markdown prose, a `//=` line closes a prose section,
//! and everything else is Rust code.
use std::fs::{File, read_to_string};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use pulldown_cmark::Parser;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Source file, output file, page title.
const PAGES: [(&str, &str, &str); 2] = [
    ("src/skip_list.rs", "skip_list.html", "Skip List in Rust"),
    ("src/level.rs", "level.html", "Skip List Heights in Rust"),
];

enum Block {
    Doc(String),
    Code(String),
}

// Splitting happens before any HTML is written, so the writer only ever sees whole blocks.
fn split_blocks(src_text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut doc = String::new();
    let mut code = String::new();

    for line in src_text.lines() {
        if let Some(prose) = line.strip_prefix("//-") {
            if !code.trim().is_empty() {
                blocks.push(Block::Code(code.trim_end().to_string()));
            }
            code.clear();
            doc += prose.strip_prefix(' ').unwrap_or(prose);
            doc += "\n";
        } else if line.starts_with("//=") {
            if !doc.is_empty() {
                blocks.push(Block::Doc(std::mem::take(&mut doc)));
            }
        } else {
            if !doc.is_empty() {
                blocks.push(Block::Doc(std::mem::take(&mut doc)));
            }
            code += line;
            code += "\n";
        }
    }
    if !doc.is_empty() {
        blocks.push(Block::Doc(doc));
    }
    if !code.trim().is_empty() {
        blocks.push(Block::Code(code.trim_end().to_string()));
    }
    blocks
}

fn output_code_block(ss: &SyntaxSet, mut html: impl Write, src_text: &str) -> Result<()> {
    let sr_rs = ss
        .find_syntax_by_extension("rs")
        .ok_or_else(|| anyhow!("no Rust syntax in the default syntax set"))?;
    let mut rs_html_generator =
        ClassedHTMLGenerator::new_with_class_style(sr_rs, ss, ClassStyle::Spaced);
    for line in LinesWithEndings::from(src_text) {
        rs_html_generator.parse_html_for_line_which_includes_newline(line)?;
    }
    let html_rs = rs_html_generator.finalize();

    writeln!(html, "<div class=\"code_block\"><pre class=\"code\">")?;
    writeln!(html, "{}", html_rs)?;
    writeln!(html, "</pre></div>")?;

    Ok(())
}

fn output_doc_block(mut html: impl Write, doc_text: &str) -> Result<()> {
    let parser = Parser::new(doc_text);

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    writeln!(html, "<div class=\"doc_block\">")?;
    writeln!(html, "{}", html_output)?;
    writeln!(html, "</div>")?;

    Ok(())
}

fn output_html(ss: &SyntaxSet, src_file: &str, out_file: &str, title: &str) -> Result<()> {
    let src_text =
        read_to_string(src_file).with_context(|| format!("reading {src_file}"))?;
    let html_file =
        File::create(Path::new(out_file)).with_context(|| format!("creating {out_file}"))?;
    let mut html = BufWriter::new(&html_file);

    // write html header
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "  <head>")?;
    writeln!(html, "    <title>{}</title>", title)?;
    writeln!(html, "    <style type=\"text/css\">")?;
    writeln!(html, "{}", include_str!("make_html.css"))?;
    writeln!(html, "    </style>")?;
    writeln!(html, "  </head>")?;
    writeln!(html, "  <body>")?;

    // a prose block opens a row, the code that follows it closes the row
    let mut row_open = false;
    for block in split_blocks(&src_text) {
        match block {
            Block::Doc(text) => {
                if row_open {
                    writeln!(html, "  </div>")?;
                }
                writeln!(html, "  <div class=\"row\">")?;
                writeln!(html, "  <div class=\"doc_group\">")?;
                output_doc_block(&mut html, &text)?;
                writeln!(html, "  </div>")?;
                row_open = true;
            }
            Block::Code(text) => {
                if !row_open {
                    writeln!(html, "  <div class=\"row\">")?;
                }
                output_code_block(ss, &mut html, &text)?;
                writeln!(html, "  </div>")?;
                row_open = false;
            }
        }
    }
    if row_open {
        writeln!(html, "  </div>")?;
    }

    // write html end
    writeln!(html, "  </body>")?;
    writeln!(html, "</html>")?;
    html.flush()?;

    Ok(())
}

fn output_theme_css(ts: &ThemeSet, theme: &str, out_file: &str) -> Result<()> {
    let theme = ts
        .themes
        .get(theme)
        .ok_or_else(|| anyhow!("missing theme {theme}"))?;
    let css_file = File::create(Path::new(out_file)).with_context(|| format!("creating {out_file}"))?;
    let mut css_writer = BufWriter::new(&css_file);

    let css = css_for_theme_with_class_style(theme, ClassStyle::Spaced)?;
    writeln!(css_writer, "{}", css)?;
    css_writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // ---------------------------------------------------------------------------------------------
    // generate html
    let ss = SyntaxSet::load_defaults_newlines();
    for (src_file, out_file, title) in PAGES {
        output_html(&ss, src_file, out_file, title)?;
    }

    // ---------------------------------------------------------------------------------------------
    // generate css files for themes
    let ts = ThemeSet::load_defaults();
    output_theme_css(&ts, "base16-eighties.dark", "theme-dark.css")?;
    output_theme_css(&ts, "Solarized (light)", "theme-light.css")?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{Block, split_blocks};

    #[test]
    fn splits_prose_and_code() {
        let src = "//- Title\n//- ==\n//=\n//- Some prose.\nfn a() {}\n\n//- More.\nfn b() {}\n";
        let blocks = split_blocks(src);
        let kinds: Vec<(&str, &str)> = blocks
            .iter()
            .map(|b| match b {
                Block::Doc(text) => ("doc", text.as_str()),
                Block::Code(text) => ("code", text.as_str()),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("doc", "Title\n==\n"),
                ("doc", "Some prose.\n"),
                ("code", "fn a() {}"),
                ("doc", "More.\n"),
                ("code", "fn b() {}"),
            ]
        );
    }
}
