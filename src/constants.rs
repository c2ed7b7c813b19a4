pub mod limits {

    pub const MIN_TOP_K: u64 = 1;
}

pub mod samples {

    /// Fixture rows inserted by `seed`.
    pub const DOCUMENTS: &[(&str, f64)] = &[
        ("Introduction to Python programming", 0.9),
        ("FastAPI for building APIs", 0.85),
        ("Understanding SQLAlchemy ORM", 0.7),
        ("Latest trends in AI and machine learning", 0.95),
        ("How to scrape websites using BeautifulSoup", 0.6),
    ];
}
