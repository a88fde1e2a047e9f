//! Extraction rule table
//!
//! Every label list, keyword set and length bound used by the extractor,
//! filter, ranker and router lives here so behavior is data, not scattered
//! logic. Windows and length bounds count chars, not bytes.

/// Date token: four-digit year then month/day in any of several separator
/// styles (YYYY-MM-DD, YYYY.MM.DD, YYYY/MM/DD, YYYYMMDD, spaces).
pub const DATE_TOKEN: &str = r"(20\d{2})[./\- ]?(0[1-9]|1[0-2])[./\- ]?(0[1-9]|[12]\d|3[01])";

/// Explicit amount: digits followed by a currency-unit suffix
pub const BUDGET_TOKEN: &str = r"([\d][\d,\.]{0,12})\s*(억원|억|만원|만|원)";

/// Labels marking an application/submission period (two dates expected)
pub const RANGE_LABELS: &[&str] = &["접수기간", "신청기간", "공고기간", "모집기간", "기간"];

/// Labels marking the announcement date
pub const ANNOUNCE_LABELS: &[&str] = &["공고일", "게시일", "등록일", "공지일"];

/// Labels marking the submission deadline
pub const CLOSE_LABELS: &[&str] = &["마감일", "접수마감", "제출마감", "신청마감"];

/// Agency labels, in priority order
pub const AGENCY_LABELS: &[&str] = &["주관기관", "주최", "전담기관", "수행기관", "기관명"];

/// Budget labels, in priority order (fallback when no explicit amount)
pub const BUDGET_LABELS: &[&str] = &["총사업비", "지원규모", "예산", "지원금액"];

/// Requirement-section labels
pub const REQUIREMENT_LABELS: &[&str] = &[
    "핵심",
    "지원대상",
    "신청자격",
    "제출서류",
    "평가기준",
    "사업내용",
    "지원내용",
    "요건",
];

/// Document-file extensions recognized as attachments
pub const ATTACHMENT_EXTS: &[&str] = &[
    ".pdf", ".hwp", ".hwpx", ".zip", ".xls", ".xlsx", ".doc", ".docx", ".ppt", ".pptx",
];

/// Title keywords identifying an announcement document
pub const NOTICE_TITLE_KEYWORDS: &[&str] = &["공고", "모집", "공모", "입찰", "사업"];

/// Body keywords identifying an announcement document
pub const NOTICE_BODY_KEYWORDS: &[&str] =
    &["접수기간", "신청기간", "지원대상", "제출서류", "신청방법", "마감"];

/// Navigation/menu-like titles rejected at every filter stage
pub const BANNED_TITLES: &[&str] = &[
    "로그인",
    "회원가입",
    "사이트맵",
    "이용약관",
    "개인정보처리방침",
    "메뉴",
    "목록",
];

/// Generic titles that get dampened by the ranker when attachment-free
pub const GENERIC_TITLES: &[&str] = &["공지사항", "공지", "알림", "안내"];

/// Words ignored by the keyword-overlap signal
pub const KEYWORD_STOPWORDS: &[&str] = &[
    "그리고", "관련", "및", "등", "찾아줘", "알려줘", "요약해줘", "the", "a", "an", "of",
];

/// Domain-notice vocabulary the router scans queries for
pub const DOMAIN_INTENT_TERMS: &[&str] = &[
    "사업공고",
    "공고",
    "입찰",
    "모집",
    "공모",
    "조달",
    "정부과제",
    "과제공고",
    "rfp",
];

/// Markers meaning the user wants fresh data, disabling the fast path
pub const RECENCY_MARKERS: &[&str] = &[
    "최신",
    "최근",
    "요즘",
    "이번 분기",
    "이번분기",
    "올해",
    "latest",
    "recent",
    "recently",
    "this quarter",
];

/// Max chars kept from text following an agency label
pub const AGENCY_VALUE_LEN: usize = 60;

/// Max chars kept from text following a budget label
pub const BUDGET_VALUE_LEN: usize = 40;

/// Half-window around a requirement label occurrence
pub const REQUIREMENTS_WINDOW: usize = 160;

/// Hard cap on the representative requirements excerpt
pub const REQUIREMENTS_CAP: usize = 400;

/// Body prefix length kept as the notice summary
pub const SUMMARY_LEN: usize = 300;
