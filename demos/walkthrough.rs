use long_map::LongMap;

fn main() -> Result<(), long_map::Error> {
    let mut map = LongMap::new();

    map.put(1, "string1")?;
    map.put(3, "string3")?;
    map.put(4, "string4")?;

    println!("size after three puts: {}", map.len());
    println!("get(2): {:?}", map.get(2)?);
    println!("get(3): {:?}", map.get(3)?);
    println!("contains_key(1): {}", map.contains_key(1)?);
    println!("contains_value(\"string4\"): {}", map.contains_value(&"string4"));

    match map.put(-1, "negative") {
        Ok(_) => println!("put(-1) unexpectedly succeeded"),
        Err(err) => println!("put(-1) rejected: {err}"),
    }

    match map.remove(2) {
        Ok(removed) => println!("remove(2): {removed:?}"),
        Err(err) => println!("remove(2) failed: {err}"),
    }

    println!("remove(1): {:?}", map.remove(1)?);
    println!("size after remove: {}", map.len());

    for (key, value) in map.iter() {
        println!("  {key} => {value}");
    }

    map.clear();
    println!("size after clear: {}", map.len());
    Ok(())
}
