//! 输入组装服务 - 业务能力层
//!
//! 把一次评分请求整理成有序的多模态内容块

use tracing::debug;

use crate::models::{GradingRequest, ImageRef};
use crate::services::image_resolver::ImageResolver;

/// 用户消息中的一个内容块
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    /// 远程 URL 或 base64 data URI
    Image(String),
}

impl ContentBlock {
    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image(_))
    }
}

/// 输入组装服务
///
/// 顺序固定：题目文本 → 题目图片 → 标准答案文本 → 标准答案图片 → 学生图片说明 → 学生图片。
/// 缺失字段直接跳过，解析失败的图片直接省略，不调整其余图片顺序。
pub struct ContentAssembler<'a> {
    resolver: &'a ImageResolver,
}

impl<'a> ContentAssembler<'a> {
    pub fn new(resolver: &'a ImageResolver) -> Self {
        Self { resolver }
    }

    pub async fn assemble(&self, request: &GradingRequest) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();

        if let Some(question) = request.question() {
            blocks.push(ContentBlock::Text(format!("Question (text): {}", question)));
        }

        self.push_labeled_images(&mut blocks, &request.question_images, "Question image")
            .await;

        if let Some(solution) = request.model_solution() {
            blocks.push(ContentBlock::Text(format!(
                "Teacher model solution (text): {}",
                solution
            )));
        }

        self.push_labeled_images(
            &mut blocks,
            &request.model_solution_images,
            "Teacher model solution image",
        )
        .await;

        if !request.student_images.is_empty() {
            blocks.push(ContentBlock::Text(format!(
                "Student submitted {} handwritten image(s). Please grade these images:",
                request.student_images.len()
            )));

            for image in &request.student_images {
                if image.is_blank() {
                    continue;
                }
                if let Some(url) = self.resolver.resolve(image).await {
                    blocks.push(ContentBlock::Image(url));
                }
            }
        }

        debug!(
            "组装完成: {} 个内容块，其中图片 {} 张",
            blocks.len(),
            blocks.iter().filter(|b| b.is_image()).count()
        );

        blocks
    }

    async fn push_labeled_images(
        &self,
        blocks: &mut Vec<ContentBlock>,
        images: &[ImageRef],
        label: &str,
    ) {
        for (idx, image) in images.iter().enumerate() {
            if image.is_blank() {
                continue;
            }
            if let Some(url) = self.resolver.resolve(image).await {
                blocks.push(ContentBlock::Text(format!("{} #{}:", label, idx + 1)));
                blocks.push(ContentBlock::Image(url));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ContentBlock {
        ContentBlock::Text(s.to_string())
    }

    fn image(s: &str) -> ContentBlock {
        ContentBlock::Image(s.to_string())
    }

    #[tokio::test]
    async fn test_full_ordering() {
        let resolver = ImageResolver::default();
        let request = GradingRequest::new(vec![
            "https://s3.site/s1.png".into(),
            "https://s3.site/s2.png".into(),
        ])
        .with_question("Giải $x^2 - 5x + 6 = 0$")
        .with_model_solution("$x = 2$ hoặc $x = 3$")
        .with_question_images(vec!["https://s3.site/q1.png".into()])
        .with_model_solution_images(vec!["https://s3.site/m1.png".into()]);

        let blocks = ContentAssembler::new(&resolver).assemble(&request).await;

        assert_eq!(
            blocks,
            vec![
                text("Question (text): Giải $x^2 - 5x + 6 = 0$"),
                text("Question image #1:"),
                image("https://s3.site/q1.png"),
                text("Teacher model solution (text): $x = 2$ hoặc $x = 3$"),
                text("Teacher model solution image #1:"),
                image("https://s3.site/m1.png"),
                text("Student submitted 2 handwritten image(s). Please grade these images:"),
                image("https://s3.site/s1.png"),
                image("https://s3.site/s2.png"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_images_are_omitted_in_order() {
        let resolver = ImageResolver::default();
        let request = GradingRequest::new(vec![
            "https://s3.site/s1.png".into(),
            "https://mock.site/s2.png".into(),
            "/no/such/file.png".into(),
            "https://s3.site/s4.png".into(),
        ])
        .with_question_images(vec![
            "https://example.com/q1.png".into(),
            "https://s3.site/q2.png".into(),
        ]);

        let blocks = ContentAssembler::new(&resolver).assemble(&request).await;

        assert_eq!(
            blocks,
            vec![
                // 标签编号沿用原始位置
                text("Question image #2:"),
                image("https://s3.site/q2.png"),
                // 数量为提交的原始图片数
                text("Student submitted 4 handwritten image(s). Please grade these images:"),
                image("https://s3.site/s1.png"),
                image("https://s3.site/s4.png"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_fields_are_skipped() {
        let resolver = ImageResolver::default();
        let request = GradingRequest::default()
            .with_question("")
            .with_model_solution("$x = 1$")
            .with_question_images(vec!["".into()]);

        let blocks = ContentAssembler::new(&resolver).assemble(&request).await;

        assert_eq!(blocks, vec![text("Teacher model solution (text): $x = 1$")]);
    }
}
