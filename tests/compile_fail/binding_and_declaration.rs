use ecu_bridge::bindings;

mod engine {
    pub fn status() -> &'static str {
        "ready"
    }
}

bindings! {
    mod engine_table = "a.b.Bridge" {
        fn status => engine::status;
    }

    mod info_table = "a.b.Bridge" {
        fn status() -> String;
    }
}

fn main() {
    let _ = engine::status();
}
