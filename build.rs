// build.rs
//
// Compiles `locales/<lang>.toml` into the `t!` macro. The language comes from a
// `lang_*` feature, then `BACKUP_STARTER_LANG`, then English.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

type Catalog = BTreeMap<String, String>;

const FALLBACK_LANG: &str = "en";

fn main() {
    println!("cargo:rerun-if-env-changed=BACKUP_STARTER_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let lang = selected_language();
    println!("cargo:rustc-env=BACKUP_STARTER_LANG_EFFECTIVE={lang}");

    let mut catalog = read_catalog(FALLBACK_LANG).expect("locales/en.toml must exist");
    if lang != FALLBACK_LANG {
        match read_catalog(&lang) {
            Some(selected) => catalog.extend(selected),
            None => println!("cargo:warning=No catalog for '{lang}', using '{FALLBACK_LANG}'."),
        }
    }

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(Path::new(&out_dir).join("translations.rs"), render_macro(&catalog))
        .expect("Failed to write translations.rs");
}

fn selected_language() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_LANG_").map(str::to_lowercase))
        .collect();
    features.sort();

    if features.len() > 1 {
        println!("cargo:warning=Several lang_* features enabled {features:?}; using the first.");
    }
    features
        .into_iter()
        .next()
        .or_else(|| env::var("BACKUP_STARTER_LANG").ok())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// `None` if the file does not exist; a malformed file fails the build.
fn read_catalog(lang: &str) -> Option<Catalog> {
    let path = format!("locales/{lang}.toml");
    let content = fs::read_to_string(&path).ok()?;
    Some(toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {path}: {e}")))
}

fn render_macro(catalog: &Catalog) -> String {
    let arms: String = catalog
        .iter()
        .map(|(key, value)| format!("    ({key:?}) => {{ {value:?} }};\n"))
        .collect();
    format!(
        "#[macro_export]\nmacro_rules! t {{\n{arms}    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n}}\n"
    )
}
