use ecu_bridge::bindings;

mod first {
    pub fn status() -> &'static str {
        "first"
    }
}

mod second {
    pub fn status() -> &'static str {
        "second"
    }
}

bindings! {
    pub mod native_bridge = "id.xms.ecucamera.bridge.NativeBridge" {
        fn getEngineStatus => first::status;
        fn getEngineStatus => second::status;
    }
}

fn main() {
    let _ = (first::status(), second::status());
}
