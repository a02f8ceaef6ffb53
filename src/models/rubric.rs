//! 评分维度目录
//!
//! 六个维度的顺序就是报告、入库和表格显示的顺序。
//! 新增维度只需要在 `RUBRIC_CATALOG` 里追加一项。

/// 单个评分维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricDimension {
    /// 维度标识（对外契约，数据库和下游都依赖它，不可随意改名）
    pub key: &'static str,
    /// 显示名称
    pub display_name: &'static str,
    /// 评分说明，作为系统消息发给模型
    pub instructions: &'static str,
    /// 目录中的位置（从 0 开始）
    pub position: usize,
}

/// 评分维度目录（固定顺序）
pub static RUBRIC_CATALOG: [RubricDimension; 6] = [
    RubricDimension {
        key: "ideas",
        display_name: "Ideas",
        instructions: IDEAS_RUBRIC,
        position: 0,
    },
    RubricDimension {
        key: "organization",
        display_name: "Organization",
        instructions: ORGANIZATION_RUBRIC,
        position: 1,
    },
    RubricDimension {
        key: "voice",
        display_name: "Voice",
        instructions: VOICE_RUBRIC,
        position: 2,
    },
    RubricDimension {
        key: "word_choice",
        display_name: "Word Choice",
        instructions: WORD_CHOICE_RUBRIC,
        position: 3,
    },
    RubricDimension {
        key: "sentence_fluency",
        display_name: "Sentence Fluency",
        instructions: SENTENCE_FLUENCY_RUBRIC,
        position: 4,
    },
    RubricDimension {
        key: "conventions",
        display_name: "Conventions",
        instructions: CONVENTIONS_RUBRIC,
        position: 5,
    },
];

/// 按固定顺序遍历目录
pub fn catalog() -> &'static [RubricDimension] {
    &RUBRIC_CATALOG
}

/// 按标识查找维度
pub fn find_dimension(key: &str) -> Option<&'static RubricDimension> {
    RUBRIC_CATALOG.iter().find(|d| d.key == key)
}

/// 维度在目录中的位置，未知标识排在最后
pub fn catalog_position(key: &str) -> usize {
    find_dimension(key)
        .map(|d| d.position)
        .unwrap_or(RUBRIC_CATALOG.len())
}

const IDEAS_RUBRIC: &str = r#"Ideas Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for the clarity, originality, and development of ideas. Grade (1-5) based on how clear, focused, original, and thoroughly developed the main idea is. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving idea development and creativity.
Grades explanation:
1: I started my writing, but I need to add ideas connected to the topic.
2: I have a focus, but I need to make my main idea clearer.
3: I have a generally clear, focused, and accurate main idea, but I need to share creative ideas.
4: I have a clear, focused, and fully developed main idea, but can share my own thoughts and opinions more creatively.
5: I have a clear, focused, important, and fully developed main idea, with original thoughts and opinions.
"#;

const ORGANIZATION_RUBRIC: &str = r#"Organization Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for organization, structure, clarity of transitions, and effectiveness of the conclusion. Grade (1-5) based on how well-organized, clear, and purposeful the writing is. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving the essay's organization and transitions.
Grades explanation:
1: I have sentences, but I can organize them better so they make more sense.
2: I have sentences but I need to organize my ideas into a clear paragraph and add transitions.
3: I have sentences that make sense together, but I need to cover the main ideas clearly in paragraphs with purposeful transitions.
4: I have a clear purpose throughout my writing and use transitions to connect different ideas, but my writing needs more variety. My ideas are separated into different paragraphs.
5: I have a clear purpose, satisfying conclusion, and use thoughtful, varied language to keep the reader's attention.
"#;

const VOICE_RUBRIC: &str = r#"Voice Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for voice, tone, expression of personality, and reader engagement. Grade (1-5) based on how effectively the writer expresses their opinion, engages the reader, and shows personality in the writing. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving the essay's voice and reader engagement.
Grades explanation:
1: I have sentences, but I need to express my opinion.
2: I shared my opinion, but I can express how I feel about the topic better.
3: I have shown some of my personality and opinions, but I need to add more flavor and hook the reader more.
4: I use a tone that supports my topic and engages my reader, but my writing needs to explore my perspective more and consider the audience.
5: I have a strong tone that supports my topic and engages the reader, and I consistently use a variety of techniques to enhance the flavor of my writing.
"#;

const WORD_CHOICE_RUBRIC: &str = r#"Word Choice Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for word choice, vocabulary variety, and use of figurative language. Grade (1-5) based on how well the writer selects words to enhance meaning and avoid repetition. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving word choice and vocabulary usage.
Grades explanation:
1: I have ideas, but I need to make sure I use the right words without repeating.
2: I have some juicy words, but I can add more juicy words that fit.
3: I have juicy vocabulary that makes sense, but I can include some figurative language.
4: I use a variety of vocabulary, but I can choose more specific words and figurative language to create an image in my reader's mind.
5: I use strong and specific words to create imagery for my reader, but I can add more powerful/varied types of figurative language.
"#;

const SENTENCE_FLUENCY_RUBRIC: &str = r#"Sentence Fluency Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for sentence structure, rhythm, and variety. Grade (1-5) based on how well the sentences flow, their complexity, and variation in structure. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving sentence fluency and rhythm.
Grades explanation:
1: I have complete sentences, but they can be reorganized to help my reader understand them better.
2: I have sentences that make sense, but I can try using complex and compound sentences.
3: I have a variety of sentence beginnings, but I can create more variety in my sentence types for more flow and rhythm.
4: I have sentences with rhythm and my ideas flow well between one and the next, but I could use more complex sentences to move the piece forward.
5: I have well-structured sentences with strong rhythm and cadence, and I use varied words/phrases to enhance the flow of the overall writing.
"#;

const CONVENTIONS_RUBRIC: &str = r#"Conventions Grader: You are an expert writing evaluator writing evaluations for children between the ages of 5 and 12. Given the essay below, evaluate it specifically for spelling, punctuation, and grammar accuracy. Grade (1-5) based on how well the writer follows standard writing conventions. Provide detailed reasoning and succinct suggestions (less than 180 characters) for improving grammar, punctuation, and spelling.
Grades explanation:
1: I have ideas, but I need to add periods and capital letters.
2: I have sentences and the reader understands some of what I'm saying, but I have some errors that make my writing hard to understand.
3: My sentences make sense. I have mostly used correct spelling and punctuation, but there are minor errors.
4: I consistently use correct spelling, punctuation, and grammar, but could introduce a variety of punctuation.
5: My writing is error-free and my choices in punctuation and grammar contribute to the creativity and clarity of the piece.
"#;
