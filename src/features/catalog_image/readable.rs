use serde::Serialize;

use super::params::ImageParams;

/// 人类可读的参数表示（有序），同时是缓存键的规范化输入。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadableParams(Vec<(&'static str, String)>);

impl ReadableParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.0
    }

    /// 以 `_` 连接全部取值，作为缓存键的哈希输入
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// 规范化参数 → 可读字符串（不含 image_type）。
///
/// 画框只有在保持宽高比时才会真正绘制，因此 `keep_frame` 的可读值取两者同时成立。
pub fn convert(params: &ImageParams) -> ReadableParams {
    let mut out = vec![
        ("image_height", format!("h: {}", opt_to_string(params.image_height))),
        ("image_width", format!("w: {}", opt_to_string(params.image_width))),
        ("quality", format!("q: {}", params.quality)),
        ("angle", format!("r: {}", opt_to_string(params.angle))),
        (
            "keep_aspect_ratio",
            if params.keep_aspect_ratio {
                "proportional"
            } else {
                "non proportional"
            }
            .to_string(),
        ),
        (
            "keep_frame",
            if params.keep_frame && params.keep_aspect_ratio {
                "frame"
            } else {
                "no frame"
            }
            .to_string(),
        ),
        (
            "keep_transparency",
            if params.keep_transparency {
                "transparency"
            } else {
                "no transparency"
            }
            .to_string(),
        ),
        (
            "constrain_only",
            if params.constrain_only {
                "do constrainonly"
            } else {
                "not constrainonly"
            }
            .to_string(),
        ),
        (
            "background",
            if params.background.is_empty() {
                "no background".to_string()
            } else {
                let rgb = params
                    .background
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("rgb {rgb}")
            },
        ),
    ];

    if let Some(wm) = &params.watermark {
        out.push(("watermark_file", wm.file.clone()));
        out.push(("watermark_image_opacity", opt_to_string(wm.image_opacity)));
        out.push((
            "watermark_position",
            wm.position.clone().unwrap_or_default(),
        ));
        out.push(("watermark_width", opt_to_string(wm.width)));
        out.push(("watermark_height", opt_to_string(wm.height)));
    }

    ReadableParams(out)
}
