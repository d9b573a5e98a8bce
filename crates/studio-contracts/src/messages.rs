use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Vi, Locale::En, Locale::Zh];

    pub fn code(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vi" => Some(Self::Vi),
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    /// Panel string for `key`, falling back to English when this locale has no entry.
    pub fn text(self, key: MessageKey) -> &'static str {
        lookup(self, key)
            .or_else(|| lookup(Locale::En, key))
            .unwrap_or_else(|| key.as_str())
    }

    pub fn usage_label(self, value: &str) -> String {
        match self {
            Self::Vi => format!("Sử dụng: {value}"),
            Self::En => format!("Usage: {value}"),
            Self::Zh => format!("使用量: {value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Title,
    LocaleLabel,
    ApiKeyLabel,
    SaveKey,
    DropZone,
    ExportDocument,
    ExportLayer,
    QuickLayer,
    PromptLabel,
    ImageCount,
    Generate,
    QuickPresets,
    Results,
    Remove,
    Copy,
    Place,
    Save,
    UsageError,
    Loading,
    SuccessCopy,
    SuccessPrompt,
    ErrorGeneral,
    CredentialMissing,
    PromptRequired,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::LocaleLabel => "localeLabel",
            Self::ApiKeyLabel => "apiKeyLabel",
            Self::SaveKey => "saveKey",
            Self::DropZone => "dropZone",
            Self::ExportDocument => "exportDocument",
            Self::ExportLayer => "exportLayer",
            Self::QuickLayer => "quickLayer",
            Self::PromptLabel => "promptLabel",
            Self::ImageCount => "imageCount",
            Self::Generate => "generate",
            Self::QuickPresets => "quickPresets",
            Self::Results => "results",
            Self::Remove => "remove",
            Self::Copy => "copy",
            Self::Place => "place",
            Self::Save => "save",
            Self::UsageError => "usageError",
            Self::Loading => "loading",
            Self::SuccessCopy => "successCopy",
            Self::SuccessPrompt => "successPrompt",
            Self::ErrorGeneral => "errorGeneral",
            Self::CredentialMissing => "credentialMissing",
            Self::PromptRequired => "promptRequired",
        }
    }
}

fn lookup(locale: Locale, key: MessageKey) -> Option<&'static str> {
    use MessageKey as K;
    let text = match (locale, key) {
        (Locale::Vi, K::Title) => "Gemini Image Studio",
        (Locale::Vi, K::LocaleLabel) => "Ngôn ngữ",
        (Locale::Vi, K::ApiKeyLabel) => "Gemini API Key",
        (Locale::Vi, K::SaveKey) => "Lưu",
        (Locale::Vi, K::DropZone) => "Kéo thả ảnh vào đây",
        (Locale::Vi, K::ExportDocument) => "Toàn bộ Canvas",
        (Locale::Vi, K::ExportLayer) => "Layer hiện tại",
        (Locale::Vi, K::QuickLayer) => "Quick Layer",
        (Locale::Vi, K::PromptLabel) => "Prompt",
        (Locale::Vi, K::ImageCount) => "Số lượng ảnh",
        (Locale::Vi, K::Generate) => "Generate",
        (Locale::Vi, K::QuickPresets) => "Quick Presets",
        (Locale::Vi, K::Results) => "Kết quả",
        (Locale::Vi, K::Remove) => "Xoá",
        (Locale::Vi, K::Copy) => "Copy",
        (Locale::Vi, K::Place) => "Chèn vào PS",
        (Locale::Vi, K::Save) => "Lưu tệp",
        (Locale::Vi, K::UsageError) => "Không thể tải hạn mức",
        (Locale::Vi, K::Loading) => "Đang tạo...",
        (Locale::Vi, K::SuccessCopy) => "Đã copy ảnh vào clipboard",
        (Locale::Vi, K::SuccessPrompt) => "Đã áp dụng preset",
        (Locale::Vi, K::ErrorGeneral) => "Có lỗi xảy ra. Vui lòng thử lại",

        (Locale::En, K::Title) => "Gemini Image Studio",
        (Locale::En, K::LocaleLabel) => "Language",
        (Locale::En, K::ApiKeyLabel) => "Gemini API Key",
        (Locale::En, K::SaveKey) => "Save",
        (Locale::En, K::DropZone) => "Drop images here",
        (Locale::En, K::ExportDocument) => "Whole Canvas",
        (Locale::En, K::ExportLayer) => "Active Layer",
        (Locale::En, K::QuickLayer) => "Quick Layer",
        (Locale::En, K::PromptLabel) => "Prompt",
        (Locale::En, K::ImageCount) => "Image count",
        (Locale::En, K::Generate) => "Generate",
        (Locale::En, K::QuickPresets) => "Quick Presets",
        (Locale::En, K::Results) => "Results",
        (Locale::En, K::Remove) => "Remove",
        (Locale::En, K::Copy) => "Copy",
        (Locale::En, K::Place) => "Place in PS",
        (Locale::En, K::Save) => "Save file",
        (Locale::En, K::UsageError) => "Unable to fetch usage",
        (Locale::En, K::Loading) => "Generating...",
        (Locale::En, K::SuccessCopy) => "Image copied to clipboard",
        (Locale::En, K::SuccessPrompt) => "Preset applied",
        (Locale::En, K::ErrorGeneral) => "Something went wrong. Please retry",
        (Locale::En, K::CredentialMissing) => "Missing API key",
        (Locale::En, K::PromptRequired) => "Prompt required",

        (Locale::Zh, K::Title) => "Gemini 图像工作室",
        (Locale::Zh, K::LocaleLabel) => "语言",
        (Locale::Zh, K::ApiKeyLabel) => "Gemini API 密钥",
        (Locale::Zh, K::SaveKey) => "保存",
        (Locale::Zh, K::DropZone) => "拖放图片到此处",
        (Locale::Zh, K::ExportDocument) => "整个画布",
        (Locale::Zh, K::ExportLayer) => "当前图层",
        (Locale::Zh, K::QuickLayer) => "快速图层",
        (Locale::Zh, K::PromptLabel) => "提示词",
        (Locale::Zh, K::ImageCount) => "生成数量",
        (Locale::Zh, K::Generate) => "生成",
        (Locale::Zh, K::QuickPresets) => "快速预设",
        (Locale::Zh, K::Remove) => "删除",
        (Locale::Zh, K::Copy) => "复制",
        (Locale::Zh, K::Place) => "导入到 PS",
        (Locale::Zh, K::Save) => "保存文件",
        (Locale::Zh, K::UsageError) => "无法读取用量",
        (Locale::Zh, K::Loading) => "生成中...",
        (Locale::Zh, K::SuccessCopy) => "已复制到剪贴板",
        (Locale::Zh, K::SuccessPrompt) => "已应用预设",
        (Locale::Zh, K::ErrorGeneral) => "发生错误，请重试",

        _ => return None,
    };
    Some(text)
}
