//! Language names, file extensions and prompt-based language inference

/// Language assumed for untagged fences and prompts with no language hint
pub const DEFAULT_LANGUAGE: &str = "python";

/// Extension used when a language is not in the table
pub const FALLBACK_EXTENSION: &str = "txt";

/// Language tag (or common alias) to file extension
const EXTENSIONS: &[(&str, &str)] = &[
    ("python", "py"),
    ("py", "py"),
    ("javascript", "js"),
    ("js", "js"),
    ("typescript", "ts"),
    ("ts", "ts"),
    ("java", "java"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("c", "c"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("cs", "cs"),
    ("go", "go"),
    ("golang", "go"),
    ("rust", "rs"),
    ("rs", "rs"),
    ("php", "php"),
    ("ruby", "rb"),
    ("rb", "rb"),
    ("swift", "swift"),
    ("kotlin", "kt"),
    ("kt", "kt"),
];

/// Words in a prompt that name a target language, mapped to the canonical
/// name sent to the backend. Bare "go" is left out: it is too common as an
/// English verb.
const PROMPT_HINTS: &[(&str, &str)] = &[
    ("python", "python"),
    ("py", "python"),
    ("javascript", "javascript"),
    ("js", "javascript"),
    ("node", "javascript"),
    ("nodejs", "javascript"),
    ("typescript", "typescript"),
    ("ts", "typescript"),
    ("java", "java"),
    ("c++", "cpp"),
    ("cpp", "cpp"),
    ("c#", "csharp"),
    ("csharp", "csharp"),
    ("c", "c"),
    ("golang", "go"),
    ("rust", "rust"),
    ("php", "php"),
    ("ruby", "ruby"),
    ("swift", "swift"),
    ("kotlin", "kotlin"),
];

/// File extension for a language tag. Case-insensitive; unknown tags map to
/// [`FALLBACK_EXTENSION`].
pub fn extension_for(language: &str) -> &'static str {
    let language = language.trim().to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(name, _)| *name == language)
        .map_or(FALLBACK_EXTENSION, |(_, ext)| ext)
}

/// Guess the target language of a code-generation prompt.
///
/// The first word that names a known language wins; prompts without one
/// get [`DEFAULT_LANGUAGE`].
pub fn detect_language(prompt: &str) -> &'static str {
    let lowered = prompt.to_lowercase();
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            PROMPT_HINTS
                .iter()
                .find(|(hint, _)| *hint == word)
                .map(|(_, canonical)| *canonical)
        })
        .unwrap_or(DEFAULT_LANGUAGE)
}
