/// Class lists applied to each element kind. Defaults are the Tailwind
/// utility classes the chat view ships with.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ClassNames {
    pub paragraph: String,
    pub code_block: String,
    pub code_block_code: String,
    pub inline_code: String,
    pub bold: String,
    pub italic: String,
    pub link: String,
    pub heading1: String,
    pub heading2: String,
    pub heading3: String,
    pub list_item: String,
    pub wrapper: String,
}

impl ClassNames {
    pub fn heading(&self, level: u8) -> &str {
        match level {
            1 => &self.heading1,
            2 => &self.heading2,
            _ => &self.heading3,
        }
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            paragraph: "mb-2".to_string(),
            code_block: "bg-gray-100 rounded-lg p-3 my-2 overflow-x-auto".to_string(),
            code_block_code: "text-sm font-mono".to_string(),
            inline_code: "bg-gray-100 px-1 py-0.5 rounded text-sm font-mono".to_string(),
            bold: "font-semibold".to_string(),
            italic: "italic".to_string(),
            link: "text-blue-600 hover:underline".to_string(),
            heading1: "text-xl font-bold mt-4 mb-2".to_string(),
            heading2: "text-lg font-semibold mt-3 mb-2".to_string(),
            heading3: "text-base font-semibold mt-2 mb-1".to_string(),
            list_item: "ml-4".to_string(),
            wrapper: "markdown-content".to_string(),
        }
    }
}

/// How numbered list items are labelled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ListNumbering {
    /// Count of numbered lines so far in the message (`5.`, `3.` show as
    /// `1.`, `2.`). This is what the chat view has always displayed.
    #[default]
    Running,
    /// The digits as typed.
    Source,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct HtmlEmitOptions {
    pub classes: ClassNames,
    /// Extra class for the outer wrapper. No wrapper is emitted without it.
    pub wrapper_class: Option<String>,
    pub numbering: ListNumbering,
}

impl HtmlEmitOptions {
    pub fn with_wrapper_class(mut self, class: impl Into<String>) -> Self {
        self.wrapper_class = Some(class.into());
        self
    }

    pub fn with_numbering(mut self, numbering: ListNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub(crate) fn wrapper_classes(&self) -> Option<String> {
        let extra = self.wrapper_class.as_deref().map(str::trim)?;
        if extra.is_empty() {
            return None;
        }
        let classes = [self.classes.wrapper.trim(), extra]
            .into_iter()
            .filter(|class| !class.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Some(classes)
    }
}
