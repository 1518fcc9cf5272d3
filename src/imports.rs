use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use oxc_allocator::Allocator;
use oxc_ast::ast::{ImportDeclarationSpecifier, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;
use tracing::trace;

use crate::model::{ImportBinding, SourceTree};
use crate::paths::normalize;

pub const DEFAULT_ROOT_ALIAS: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    pub specifier: String,
    pub aliases: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    pub root: &'a Path,
    /// Leading specifier segment resolved against `root` instead of the importing file.
    pub root_alias: &'a str,
}

pub fn parse_directives(path: &Path, text: &str) -> Vec<ImportDirective> {
    if !text.contains("import") {
        return Vec::new();
    }
    parse_with_oxc(path, text).unwrap_or_else(|| lexical_directives(text))
}

fn parse_with_oxc(path: &Path, text: &str) -> Option<Vec<ImportDirective>> {
    let source_type = SourceType::from_path(path).ok()?;
    let allocator = Allocator::new();
    let ret = Parser::new(&allocator, text, source_type).parse();
    if ret.panicked {
        trace!("parser gave up on {}, using line scanner", path.display());
        return None;
    }

    let mut out = Vec::new();
    for stmt in &ret.program.body {
        let Statement::ImportDeclaration(decl) = stmt else {
            continue;
        };
        if decl.import_kind.is_type() {
            continue;
        }
        let Some(specifiers) = &decl.specifiers else {
            continue;
        };
        let aliases: BTreeSet<String> = specifiers
            .iter()
            .filter_map(|spec| match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => Some(s.local.name.to_string()),
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => Some(s.local.name.to_string()),
                ImportDeclarationSpecifier::ImportSpecifier(s) if !s.import_kind.is_type() => {
                    Some(s.local.name.to_string())
                }
                ImportDeclarationSpecifier::ImportSpecifier(_) => None,
            })
            .collect();
        if !aliases.is_empty() {
            out.push(ImportDirective {
                specifier: decl.source.value.to_string(),
                aliases,
            });
        }
    }
    Some(out)
}

/// Fallback for sources the parser rejects.
pub fn lexical_directives(text: &str) -> Vec<ImportDirective> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*import\s+(type\s+)?([^'";]*?)\s*from\s*['"]([^'"]+)['"]"#).expect("regex")
    });

    re.captures_iter(text)
        .filter(|cap| cap.get(1).is_none())
        .filter_map(|cap| {
            let aliases = clause_aliases(&cap[2]);
            if aliases.is_empty() {
                None
            } else {
                Some(ImportDirective {
                    specifier: cap[3].to_string(),
                    aliases,
                })
            }
        })
        .collect()
}

fn clause_aliases(clause: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let clause = clause.trim();
    let (head, braced) = match clause.find('{') {
        Some(open) => {
            let close = clause[open..].find('}').map_or(clause.len(), |c| open + c);
            (&clause[..open], Some(&clause[open + 1..close]))
        }
        None => (clause, None),
    };

    for part in head.split(',') {
        let part = part.trim();
        if let Some(ns) = part.strip_prefix('*') {
            if let Some(name) = ns.trim().strip_prefix("as") {
                push_ident(&mut out, name);
            }
        } else {
            push_ident(&mut out, part);
        }
    }

    if let Some(names) = braced {
        for item in names.split(',') {
            let item = item.trim();
            if item.starts_with("type ") {
                continue;
            }
            let local = item.rsplit(" as ").next().unwrap_or(item);
            push_ident(&mut out, local);
        }
    }
    out
}

fn push_ident(out: &mut BTreeSet<String>, raw: &str) {
    let name = raw.trim();
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        out.insert(name.to_string());
    }
}

/// Absolute, extension-less location a specifier points at.
pub fn resolve_specifier(consuming: &Path, specifier: &str, opts: ResolveOptions<'_>) -> PathBuf {
    let rooted = specifier == opts.root_alias
        || specifier
            .strip_prefix(opts.root_alias)
            .is_some_and(|rest| rest.starts_with('/'));
    let base = if rooted {
        opts.root.to_path_buf()
    } else {
        consuming.parent().unwrap_or(opts.root).to_path_buf()
    };
    normalize(&base.join(specifier))
}

pub fn match_style(base: &Path, styles: &BTreeSet<PathBuf>) -> Option<PathBuf> {
    if styles.contains(base) {
        return Some(base.to_path_buf());
    }
    let exts: BTreeSet<&std::ffi::OsStr> = styles.iter().filter_map(|s| s.extension()).collect();
    for ext in exts {
        let mut with_ext = OsString::from(base.as_os_str());
        with_ext.push(".");
        with_ext.push(ext);
        let cand = PathBuf::from(with_ext);
        if styles.contains(&cand) {
            return Some(cand);
        }
        let mut index = OsString::from("index.");
        index.push(ext);
        let cand = base.join(index);
        if styles.contains(&cand) {
            return Some(cand);
        }
    }
    None
}

#[derive(Debug, Clone, Default)]
pub struct ImportIndex {
    by_target: BTreeMap<PathBuf, Vec<ImportBinding>>,
}

impl ImportIndex {
    pub fn build(tree: &SourceTree, styles: &BTreeSet<PathBuf>, opts: ResolveOptions<'_>) -> Self {
        let mut by_target: BTreeMap<PathBuf, Vec<ImportBinding>> = BTreeMap::new();
        for (file, text) in tree.iter() {
            for d in parse_directives(file, text) {
                let base = resolve_specifier(file, &d.specifier, opts);
                let Some(target) = match_style(&base, styles) else {
                    continue;
                };
                by_target.entry(target.clone()).or_default().push(ImportBinding {
                    consuming_file: file.to_path_buf(),
                    resolved_module_path: target,
                    local_aliases: d.aliases,
                });
            }
        }
        Self { by_target }
    }

    pub fn bindings_for(&self, style: &Path) -> &[ImportBinding] {
        self.by_target.get(style).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(root: &Path) -> ResolveOptions<'_> {
        ResolveOptions {
            root,
            root_alias: DEFAULT_ROOT_ALIAS,
        }
    }

    #[test]
    fn parses_default_named_and_namespace_imports() {
        let text = "import S from './Button.styles';\n\
import { a, b as c } from '../shared';\n\
import D, { e } from 'app/theme';\n\
import * as NS from './ns';\n\
import type { T } from './types';\n\
import './side-effect';\n";
        let dirs = parse_directives(Path::new("/p/app/x.tsx"), text);
        let got: Vec<(String, Vec<String>)> = dirs
            .into_iter()
            .map(|d| (d.specifier, d.aliases.into_iter().collect()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("./Button.styles".to_string(), vec!["S".to_string()]),
                ("../shared".to_string(), vec!["a".to_string(), "c".to_string()]),
                ("app/theme".to_string(), vec!["D".to_string(), "e".to_string()]),
                ("./ns".to_string(), vec!["NS".to_string()]),
            ]
        );
    }

    #[test]
    fn lexical_scanner_matches_parser_on_plain_imports() {
        let text = "import S from './Button.styles';\nimport {\n  a,\n  b as c,\n} from \"../shared\";\nimport type X from './x';\nimport * as NS from './ns';\n";
        let lexical = lexical_directives(text);
        assert_eq!(lexical.len(), 3);
        assert_eq!(lexical[1].specifier, "../shared");
        assert_eq!(lexical[1].aliases, BTreeSet::from(["a".to_string(), "c".to_string()]));
        assert_eq!(lexical[2].aliases, BTreeSet::from(["NS".to_string()]));
    }

    #[test]
    fn unknown_extensions_use_line_scanner() {
        let dirs = parse_directives(Path::new("/p/app/x.vue"), "import S from './a.styles'\n");
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].specifier, "./a.styles");
    }

    #[test]
    fn relative_and_root_alias_resolution() {
        let root = Path::new("/proj");
        let file = Path::new("/proj/app/screens/Home.tsx");
        assert_eq!(
            resolve_specifier(file, "../Button.styles", opts(root)),
            PathBuf::from("/proj/app/Button.styles")
        );
        assert_eq!(
            resolve_specifier(file, "app/Button.styles", opts(root)),
            PathBuf::from("/proj/app/Button.styles")
        );
        assert_eq!(
            resolve_specifier(file, "apple/x", opts(root)),
            PathBuf::from("/proj/app/screens/apple/x")
        );
    }

    #[test]
    fn match_appends_style_extension() {
        let styles = BTreeSet::from([
            PathBuf::from("/proj/app/Button.styles.ts"),
            PathBuf::from("/proj/app/card/index.tsx"),
        ]);
        assert_eq!(
            match_style(Path::new("/proj/app/Button.styles"), &styles),
            Some(PathBuf::from("/proj/app/Button.styles.ts"))
        );
        assert_eq!(
            match_style(Path::new("/proj/app/Button.styles.ts"), &styles),
            Some(PathBuf::from("/proj/app/Button.styles.ts"))
        );
        assert_eq!(
            match_style(Path::new("/proj/app/card"), &styles),
            Some(PathBuf::from("/proj/app/card/index.tsx"))
        );
        assert_eq!(match_style(Path::new("/proj/app/Other"), &styles), None);
    }

    #[test]
    fn index_groups_bindings_by_style_file() {
        let root = Path::new("/proj");
        let styles = BTreeSet::from([PathBuf::from("/proj/app/Button.styles.ts")]);
        let tree = SourceTree::new(BTreeMap::from([
            (
                PathBuf::from("/proj/app/Button.tsx"),
                "import { header, footer as F } from './Button.styles';\nimport X from './Other';\n".to_string(),
            ),
            (PathBuf::from("/proj/app/Other.tsx"), "import X from './Other';\n".to_string()),
        ]));

        let index = ImportIndex::build(&tree, &styles, opts(root));
        let bindings = index.bindings_for(Path::new("/proj/app/Button.styles.ts"));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].consuming_file, PathBuf::from("/proj/app/Button.tsx"));
        assert_eq!(
            bindings[0].local_aliases,
            BTreeSet::from(["F".to_string(), "header".to_string()])
        );
        assert!(index.bindings_for(Path::new("/proj/app/Other.ts")).is_empty());
    }
}
