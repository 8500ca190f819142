/// Built-in fixture the host uses to patch dependencies; never wrapped.
pub const PATCHING_NODE: &str = "monkeypatch";
