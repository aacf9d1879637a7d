use ecu_bridge::bindings;

bindings! {
    mod table = "a.b.Bridge" {
        fn probe(Widget) -> String;
    }
}

fn main() {}
