use color_eyre::eyre::{self, eyre, WrapErr};
use log::debug;
use std::fs::File;
use std::io::Write;
use std::{fs, path::Path};
use tera::Tera;

/// Delete all contents of a directory without modifying the directory itself
///
/// This function prints error messages directly to `STDERR` but otherwise ignores them and does not fail
pub fn delete_dir_contents<P: AsRef<Path>>(path: P) {
    match fs::read_dir(path) {
        Err(e) => eprintln!("could not read output dir: {}", e),
        Ok(dir) => {
            for entry in dir {
                match entry {
                    Err(e) => eprintln!("entry error in output dir: {}", e),
                    Ok(entry) => {
                        let path = entry.path();

                        if path.is_dir() {
                            if let Err(e) = fs::remove_dir_all(path) {
                                eprintln!("could not delete directory in output dir: {}", e);
                            };
                        } else if let Err(e) = fs::remove_file(path) {
                            eprintln!("could not delete file in output dir: {}", e);
                        }
                    }
                }
            }
        }
    }
}

pub fn render(tera: &Tera, template_name: &str, context: &tera::Context) -> eyre::Result<String> {
    Ok(tera.render(template_name, context)?)
}

pub fn render_to(
    tera: &Tera,
    template_name: &str,
    context: &tera::Context,
    write: impl Write,
) -> eyre::Result<()> {
    Ok(tera.render_to(template_name, context, write)?)
}

pub fn write_template(
    tera: &Tera,
    template_name: &str,
    context: &tera::Context,
    file_path: &Path,
) -> eyre::Result<()> {
    debug!("writing template to file: {:?}", file_path);
    let output_file = File::create(file_path)?;
    render_to(tera, template_name, context, output_file)
}

/// Compile a sass stylesheet from disk, falling back to the given embedded
/// source when the file is missing
pub fn compile_stylesheet(source_path: &Path, fallback: &str) -> eyre::Result<String> {
    let result = if source_path.exists() {
        grass::from_path(source_path, &grass::Options::default())
    } else {
        debug!(
            "no stylesheet at {:?}, compiling the embedded default",
            source_path
        );
        // from_string cannot infer the indented syntax from a file extension
        let options = grass::Options::default().input_syntax(grass::InputSyntax::Sass);
        grass::from_string(fallback.to_owned(), &options)
    };

    result.map_err(|e| eyre!("could not compile the stylesheet: {}", e))
}

/// Replace the content of the element matching `selector` in `page` with `content`
pub fn embed_in_page(page: &str, selector: &str, content: &str) -> eyre::Result<String> {
    use lol_html::html_content::ContentType;
    use lol_html::{element, rewrite_str, RewriteStrSettings};

    rewrite_str(
        page,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                el.set_inner_content(content, ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .wrap_err_with(|| format!("could not embed into the element matching '{}'", selector))
}
