/// Extension-based categorization for desktop files.
///
/// A [`CategoryMap`] is an ordered list of named categories, each owning a list of
/// lowercase extensions (with the leading dot). Classification walks the categories
/// in insertion order and the first one listing the file's extension wins.
///
/// # Examples
///
/// ```
/// use desktidy::category_map::CategoryMap;
///
/// let map = CategoryMap::default();
/// assert_eq!(map.classify("report.PDF"), "Documents");
/// assert_eq!(map.classify("song.mp3"), "Music");
/// assert_eq!(map.classify("mystery.xyz"), "Others");
/// ```
use indexmap::IndexMap;

/// Folder that receives every file no category claims.
///
/// Routing to this folder does not depend on the map: a map that renames or
/// omits `Others` still sends unmatched files here.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Ordered mapping from category name to the extensions routed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap {
    categories: IndexMap<String, Vec<String>>,
}

impl CategoryMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            categories: IndexMap::new(),
        }
    }

    /// Built-in categories for common documents, images, videos and music,
    /// plus an empty `Others` bucket.
    pub fn builtin() -> Self {
        let mut map = Self::new();
        map.add_category("Documents", &[".txt", ".doc", ".docx", ".pdf"]);
        map.add_category("Images", &[".jpg", ".png", ".gif", ".bmp"]);
        map.add_category("Videos", &[".mp4", ".avi", ".mov"]);
        map.add_category("Music", &[".mp3", ".wav", ".flac"]);
        map.add_category::<&str>(FALLBACK_CATEGORY, &[]);
        map
    }

    /// Extra categories layered on top of the built-in ones by the desktop entry point.
    pub fn supplemental() -> Self {
        let mut map = Self::new();
        map.add_category("Programming", &[".py", ".java", ".c", ".cpp"]);
        map.add_category("Spreadsheets", &[".xls", ".xlsx", ".csv"]);
        map.add_category("Compressed", &[".zip", ".rar", ".7z"]);
        map
    }

    /// Built-in categories followed by the supplemental ones.
    pub fn default_with_supplemental() -> Self {
        let mut map = Self::builtin();
        map.extend(Self::supplemental());
        map
    }

    /// Returns the map used for classification.
    ///
    /// Uses `custom` when given, the built-in map otherwise. The result always
    /// contains the fallback category so that its folder gets created.
    pub fn resolve(custom: Option<CategoryMap>) -> Self {
        let mut map = custom.unwrap_or_else(Self::builtin);
        if !map.categories.contains_key(FALLBACK_CATEGORY) {
            map.categories.insert(FALLBACK_CATEGORY.to_string(), Vec::new());
        }
        map
    }

    /// Adds a category, or appends extensions to an existing one.
    ///
    /// Extensions are normalized to lowercase with a leading dot, so `"PDF"` and
    /// `".pdf"` are the same entry. Duplicates within a category are dropped.
    pub fn add_category<S: AsRef<str>>(&mut self, name: &str, extensions: &[S]) {
        let entry = self.categories.entry(name.to_string()).or_default();
        for ext in extensions {
            let ext = normalize_extension(ext.as_ref());
            if !entry.contains(&ext) {
                entry.push(ext);
            }
        }
    }

    /// Appends every category of `other`, keeping this map's order first.
    pub fn extend(&mut self, other: CategoryMap) {
        for (name, extensions) in other.categories {
            self.add_category(&name, &extensions[..]);
        }
    }

    /// Category names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Extensions registered for a category.
    pub fn extensions(&self, name: &str) -> Option<&[String]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Looks up the first category listing `extension`.
    pub fn category_for_extension(&self, extension: &str) -> Option<&str> {
        let extension = extension.to_lowercase();
        self.categories
            .iter()
            .find(|(_, exts)| exts.contains(&extension))
            .map(|(name, _)| name.as_str())
    }

    /// Returns the destination category for a file name.
    ///
    /// Unmatched names go to [`FALLBACK_CATEGORY`].
    pub fn classify(&self, file_name: &str) -> &str {
        self.category_for_extension(&extension_of(file_name))
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl From<IndexMap<String, Vec<String>>> for CategoryMap {
    fn from(raw: IndexMap<String, Vec<String>>) -> Self {
        let mut map = Self::new();
        for (name, extensions) in raw {
            map.add_category(&name, &extensions[..]);
        }
        map
    }
}

/// Extracts the lowercase extension of a file name, including the dot.
///
/// Leading dots are part of the name, so `.bashrc` has no extension.
/// A name without an extension yields an empty string.
///
/// ```
/// use desktidy::category_map::extension_of;
///
/// assert_eq!(extension_of("Photo.JPG"), ".jpg");
/// assert_eq!(extension_of("backup.tar.gz"), ".gz");
/// assert_eq!(extension_of(".bashrc"), "");
/// assert_eq!(extension_of("notes"), "");
/// ```
pub fn extension_of(file_name: &str) -> String {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(dot) => file_name[stem_start + dot..].to_lowercase(),
        None => String::new(),
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
