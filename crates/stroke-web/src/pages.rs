//! 页面渲染
//!
//! 服务端直接输出HTML，不依赖静态资源目录

use stroke_core::{
    EverMarried, FieldError, Gender, RawFormInput, ResidenceType, RiskAssessment, SmokingStatus,
    WorkType,
};
use stroke_workflow::PredictionSession;

/// 表单页需要的全部展示数据
#[derive(Debug, Clone)]
pub struct PredictionView<'a> {
    pub form: &'a RawFormInput,
    pub field_errors: &'a [FieldError],
    pub request_error: Option<&'a str>,
    pub assessment: Option<&'a RiskAssessment>,
    pub submit_enabled: bool,
}

impl<'a> PredictionView<'a> {
    pub fn from_session(session: &'a PredictionSession) -> Self {
        Self {
            form: session.form(),
            field_errors: session.field_errors(),
            request_error: session.request_error(),
            assessment: session.assessment(),
            submit_enabled: session.is_submit_enabled(),
        }
    }

    fn error_for(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// HTML转义
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f7f7f5; color: #222; }
    nav { display: flex; gap: 24px; align-items: center; padding: 16px 32px; background: rgba(128, 128, 128, 0.2); }
    nav .brand { font-weight: 800; margin-right: auto; }
    nav a { color: inherit; text-decoration: none; }
    nav a.active { font-weight: 700; }
    main { max-width: 960px; margin: 0 auto; padding: 48px 20px; }
    h1.hero { font-size: 3rem; text-align: center; background: linear-gradient(90deg, #84cc16, #f59e0b); -webkit-background-clip: text; color: transparent; }
    p.lead { font-size: 1.25rem; text-align: center; color: #666; margin: 16px auto 32px; max-width: 720px; }
    .cta { text-align: center; margin-bottom: 48px; }
    .button { display: inline-block; padding: 12px 24px; border: 0; border-radius: 6px; background: #111; color: #fff; font-size: 1rem; cursor: pointer; text-decoration: none; }
    .button:disabled { opacity: 0.6; cursor: not-allowed; }
    .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 24px; }
    .card { background: #fff; border-radius: 10px; padding: 24px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.08); }
    .card h3 { margin-bottom: 8px; }
    .badge { font-size: 0.75rem; background: #eee; border-radius: 999px; padding: 2px 10px; }
    form .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 20px; }
    label { display: block; font-weight: 600; margin-bottom: 6px; }
    input, select { width: 100%; padding: 8px; border: 1px solid #ccc; border-radius: 6px; font-size: 1rem; }
    .field-error { color: #b91c1c; font-size: 0.85rem; margin-top: 4px; }
    .alert { border-radius: 8px; padding: 16px; margin: 20px 0; border: 1px solid #ddd; background: #fff; }
    .alert.destructive { border-color: #b91c1c; color: #b91c1c; }
    .alert h4 { margin-bottom: 4px; }
    button[type=submit] { width: 100%; }
"#;

fn layout(title: &str, active: &str, body: &str) -> String {
    let link = |href: &str, label: &str| {
        let class = if href == active { " class=\"active\"" } else { "" };
        format!("<a href=\"{}\"{}>{}</a>", href, class, label)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="Predict stroke risk using a machine learning model">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <nav>
        <span class="brand">Stroke Prediction App</span>
        {home}
        {prediction}
    </nav>
    <main>
{body}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        style = STYLE,
        home = link("/", "Home"),
        prediction = link("/prediction", "Prediction"),
        body = body,
    )
}

/// 落地页
pub fn render_landing() -> String {
    let features = [
        (
            "AI-Powered Analysis",
            "Advanced machine learning algorithms analyze multiple health factors",
            "Machine Learning",
        ),
        (
            "Comprehensive Monitoring",
            "Track and assess multiple health metrics contributing to stroke risk",
            "360° Health View",
        ),
        (
            "Personalized Prevention",
            "Tailored recommendations to mitigate individual stroke risks",
            "Custom Insights",
        ),
    ];

    let cards: String = features
        .iter()
        .map(|(title, description, badge)| {
            format!(
                r#"        <div class="card"><span class="badge">{}</span><h3>{}</h3><p>{}</p></div>
"#,
                badge, title, description
            )
        })
        .collect();

    let body = format!(
        r#"        <h1 class="hero">Stroke Risk Intelligence</h1>
        <p class="lead">Leverage cutting-edge AI to predict, understand, and proactively manage your stroke risk through comprehensive health analysis.</p>
        <div class="cta"><a class="button" href="/prediction">Start Risk Assessment &rarr;</a></div>
        <section class="cards">
{}        </section>"#,
        cards
    );

    layout("Stroke Risk Intelligence", "/", &body)
}

fn number_field(view: &PredictionView<'_>, name: &str, label: &str, value: &str, placeholder: &str) -> String {
    format!(
        r#"<div><label for="{name}">{label}</label><input type="number" step="any" id="{name}" name="{name}" value="{value}" placeholder="{placeholder}">{error}</div>"#,
        name = name,
        label = label,
        value = escape_html(value),
        placeholder = placeholder,
        error = field_error(view.error_for(name)),
    )
}

fn select_field(
    view: &PredictionView<'_>,
    name: &str,
    label: &str,
    selected: &str,
    options: &[(&str, &str)],
) -> String {
    let opts: String = options
        .iter()
        .map(|(value, text)| {
            let mark = if *value == selected { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, escape_html(value), mark, text)
        })
        .collect();

    format!(
        r#"<div><label for="{name}">{label}</label><select id="{name}" name="{name}">{opts}</select>{error}</div>"#,
        name = name,
        label = label,
        opts = opts,
        error = field_error(view.error_for(name)),
    )
}

fn field_error(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<p class="field-error">{}</p>"#, escape_html(m)))
        .unwrap_or_default()
}

fn option_labels<T: Copy>(all: &[T], label: impl Fn(T) -> (&'static str, &'static str)) -> Vec<(&'static str, &'static str)> {
    all.iter().map(|v| label(*v)).collect()
}

/// 风险评估结果横幅
pub fn render_assessment(assessment: &RiskAssessment) -> String {
    let class = if assessment.is_high_risk() {
        "alert destructive"
    } else {
        "alert"
    };
    let probability = assessment
        .probability
        .map(|p| format!("<p>Estimated probability: {:.1}%</p>", p * 100.0))
        .unwrap_or_default();

    format!(
        r#"<div class="{}" id="result"><h4>{}</h4><p>{}</p>{}</div>"#,
        class,
        escape_html(assessment.title),
        escape_html(assessment.message),
        probability
    )
}

/// 风险评估表单页
pub fn render_prediction(view: &PredictionView<'_>) -> String {
    let form = view.form;
    let flag_options = [("0", "No"), ("1", "Yes")];

    let gender = option_labels(&Gender::ALL, |g| (g.as_str(), g.as_str()));
    let married = option_labels(&EverMarried::ALL, |m| (m.as_str(), m.as_str()));
    let work = option_labels(&WorkType::ALL, |w| {
        let text = match w {
            WorkType::Private => "Private",
            WorkType::SelfEmployed => "Self-employed",
            WorkType::GovtJob => "Government Job",
            WorkType::Children => "Children",
        };
        (w.as_str(), text)
    });
    let residence = option_labels(&ResidenceType::ALL, |r| (r.as_str(), r.as_str()));
    let smoking = option_labels(&SmokingStatus::ALL, |s| {
        let text = match s {
            SmokingStatus::NeverSmoked => "Never Smoked",
            SmokingStatus::Smokes => "Smokes",
            SmokingStatus::FormerlySmoked => "Formerly Smoked",
        };
        (s.as_str(), text)
    });

    let request_error = view
        .request_error
        .map(|message| {
            format!(
                r#"<div class="alert destructive" role="alert"><h4>Error</h4><p>{}</p></div>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();

    let result = view.assessment.map(render_assessment).unwrap_or_default();
    let disabled = if view.submit_enabled { "" } else { " disabled" };

    let body = format!(
        r#"        <div class="card">
        <h2>Stroke Risk Assessment</h2>
        <form method="post" action="/prediction" onsubmit="var b=this.querySelector('button[type=submit]');b.disabled=true;b.textContent='Predicting...';">
            <div class="grid">{age}{gender}</div>
            <div class="grid">{glucose}{bmi}</div>
            <div class="grid">{hypertension}{heart}{smoking}</div>
            <div class="grid">{work}{residence}{married}</div>
            {request_error}
            <button class="button" type="submit"{disabled}>Assess Stroke Risk</button>
        </form>
        {result}
        </div>"#,
        age = number_field(view, "age", "Age", &form.age, "Enter age"),
        gender = select_field(view, "gender", "Gender", &form.gender, &gender),
        glucose = number_field(
            view,
            "avg_glucose_level",
            "Average Glucose Level",
            &form.avg_glucose_level,
            "Enter glucose level"
        ),
        bmi = number_field(view, "bmi", "BMI", &form.bmi, "Enter BMI"),
        hypertension = select_field(view, "hypertension", "Hypertension", &form.hypertension, &flag_options),
        heart = select_field(view, "heart_disease", "Heart Disease", &form.heart_disease, &flag_options),
        smoking = select_field(view, "smoking_status", "Smoking Status", &form.smoking_status, &smoking),
        work = select_field(view, "work_type", "Work Type", &form.work_type, &work),
        residence = select_field(view, "Residence_type", "Residence Type", &form.residence_type, &residence),
        married = select_field(view, "ever_married", "Ever Married", &form.ever_married, &married),
        request_error = request_error,
        disabled = disabled,
        result = result,
    );

    layout("Stroke Risk Assessment", "/prediction", &body)
}
