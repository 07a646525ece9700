use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

// Supported interface languages. The first one is the default.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Zh => "中文",
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("appTitle", "AI Story & Storyboard Generator"),
    ("promptTemplates", "Prompt Templates"),
    ("autoOptimize", "Auto-optimize"),
    ("edit", "Edit"),
    ("delete", "Delete"),
    ("editTemplate", "Edit Template"),
    ("newTemplate", "New Template"),
    ("templateName", "Template Name"),
    ("templateContent", "Template content, use {{variable}} for placeholders"),
    ("cancel", "Cancel"),
    ("saveChanges", "Save Changes"),
    ("addTemplate", "Add Template"),
    ("storyCanvas", "Story Canvas"),
    ("autoFormat", "Auto-format"),
    ("generateStoryboard", "Generate Storyboard"),
    ("storyPlaceholder", "Your generated story will appear here..."),
    ("noStoryboard", "Your storyboard will appear here once generated."),
    ("storyboard", "Storyboard"),
    ("scene", "Scene"),
    ("camera", "Camera"),
    ("setting", "Setting"),
    ("action", "Action"),
    ("dialogue", "Dialogue"),
    ("generatingImage", "Generating image..."),
    ("visual", "Visual"),
    ("generateImage", "Generate Image"),
    ("storyGeneration", "Story Generation"),
    ("selectTemplate", "Select a template to start generating a story."),
    ("storyTopic", "Story Topic"),
    ("storyTopicPlaceholder", "e.g., A knight who is afraid of the dark"),
    ("fillVariables", "Fill in the variables"),
    ("noVariables", "This template has no variables."),
    ("generateStory", "Generate Story"),
    ("generatingStory", "Generating story..."),
    ("errorOccurred", "An error occurred. Please try again."),
    ("formattingStory", "Formatting story..."),
    ("generatingStoryboard", "Generating storyboard..."),
    ("optimizingTemplate", "Optimizing template..."),
    ("busy", "Please wait for the current operation to finish."),
    ("templateNotFound", "Template not found."),
    ("templateRequired", "A template needs both a name and content."),
    ("emptyStory", "Write or generate a story first."),
    ("emptyTopic", "Enter a story topic first."),
    ("language", "Language"),
];

const ZH: &[(&str, &str)] = &[
    ("appTitle", "AI 故事与分镜生成器"),
    ("promptTemplates", "提示词模板"),
    ("autoOptimize", "自动优化"),
    ("edit", "编辑"),
    ("delete", "删除"),
    ("editTemplate", "编辑模板"),
    ("newTemplate", "新建模板"),
    ("templateName", "模板名称"),
    ("templateContent", "模板内容，使用 {{variable}} 作为占位符"),
    ("cancel", "取消"),
    ("saveChanges", "保存更改"),
    ("addTemplate", "添加模板"),
    ("storyCanvas", "故事画布"),
    ("autoFormat", "自动排版"),
    ("generateStoryboard", "生成分镜"),
    ("storyPlaceholder", "生成的故事将显示在这里..."),
    ("noStoryboard", "生成后，分镜将显示在这里。"),
    ("storyboard", "分镜"),
    ("scene", "场景"),
    ("camera", "镜头"),
    ("setting", "场景设定"),
    ("action", "动作"),
    ("dialogue", "对白"),
    ("generatingImage", "正在生成图片..."),
    ("visual", "画面"),
    ("generateImage", "生成图片"),
    ("storyGeneration", "故事生成"),
    ("selectTemplate", "请选择一个模板开始生成故事。"),
    ("storyTopic", "故事主题"),
    ("storyTopicPlaceholder", "例如：一个怕黑的骑士"),
    ("fillVariables", "填写变量"),
    ("noVariables", "此模板没有变量。"),
    ("generateStory", "生成故事"),
    ("generatingStory", "正在生成故事..."),
    ("errorOccurred", "发生错误，请重试。"),
    ("formattingStory", "正在排版故事..."),
    ("generatingStoryboard", "正在生成分镜..."),
    ("optimizingTemplate", "正在优化模板..."),
    ("busy", "请等待当前操作完成。"),
    ("templateNotFound", "未找到模板。"),
    ("templateRequired", "模板名称和内容都不能为空。"),
    ("emptyStory", "请先编写或生成故事。"),
    ("emptyTopic", "请先输入故事主题。"),
    ("language", "语言"),
];

static LOCALIZATIONS: Lazy<HashMap<Language, HashMap<&'static str, &'static str>>> =
    Lazy::new(|| {
        HashMap::from([
            (Language::En, EN.iter().copied().collect()),
            (Language::Zh, ZH.iter().copied().collect()),
        ])
    });

/// Looks up user-facing strings for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Localizer {
    language: Language,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The localized string for `key`, or the key itself when there is none.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        LOCALIZATIONS
            .get(&self.language)
            .and_then(|table| table.get(key).copied())
            .unwrap_or(key)
    }
}
