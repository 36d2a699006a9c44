//! Text produced by the `files` and `at` commands.

use brine_resolve::CompiledResult;

/// One line per loaded file, in parse order, with how it was reached.
pub fn file_listing(result: &CompiledResult) -> Vec<String> {
    result
        .files
        .iter()
        .map(|file| match &file.directive {
            Some(site) => format!("{} (imported by {})", file.uri, site.file),
            None if result.entry.as_ref() == Some(&file.uri) => format!("{} (entry)", file.uri),
            None => file.uri.to_string(),
        })
        .collect()
}

/// The declaration or struct field whose name covers `offset` in the entry
/// file.
pub fn describe_position(result: &CompiledResult, offset: u32) -> Option<String> {
    let entry = result.entry.as_ref()?;
    if let Some(decl) = result.declaration_at(entry, offset) {
        return Some(decl.to_string());
    }
    result
        .field_at(entry, offset)
        .map(|(def, field)| format!("field {}.{}: {}", def.name, field.name, field.ty))
}
